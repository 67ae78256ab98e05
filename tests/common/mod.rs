//! Helpers shared by the trace tests: a fixed signing key and builders for
//! signed trace text.

#![allow(dead_code)]

use base64::Engine;
use chiplab65::{image_checksum, TraceVerifier};
use ed25519_dalek::{Signer, SigningKey};

pub const SECRET_KEY: [u8; 32] = [0x42; 32];

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&SECRET_KEY)
}

pub fn verifier() -> TraceVerifier {
    TraceVerifier::new(signing_key().verifying_key().as_bytes()).unwrap()
}

/// Builds the key section: markers, an optional `InputSha256` header for
/// `image`, then one line per record.
pub fn key_section(image: Option<&[u8]>, records: &[&str]) -> String {
    let mut text = String::from("===BEGIN SIGNED DATA===\n");
    if let Some(image) = image {
        text.push_str(&format!("InputSha256={}\n", image_checksum(image)));
    }
    for record in records {
        text.push_str(record);
        text.push('\n');
    }
    text.push_str("===END SIGNED DATA===");
    text
}

/// Appends a valid signature line to `key_section`.
pub fn sign(key_section: &str) -> String {
    let signature = signing_key().sign(key_section.as_bytes());
    let encoded = base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());
    format!("{}\n{}\n", key_section, encoded)
}

/// A 64 KiB image with the reset vector at $8000 and `program` there.
pub fn image_with_program(program: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; 0x10000];
    image[0xFFFC] = 0x00;
    image[0xFFFD] = 0x80;
    image[0x8000..0x8000 + program.len()].copy_from_slice(program);
    image
}
