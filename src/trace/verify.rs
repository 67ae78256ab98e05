//! Ed25519 verification of the trace key section.

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use log::debug;
use thiserror::Error;

use super::{parse_key_section, SignedTrace, BEGIN_MARKER, END_MARKER};

/// Why a trace could not be loaded.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("trace does not start with `{}`", BEGIN_MARKER)]
    MissingBeginMarker,

    #[error("trace has no `{}` line", END_MARKER)]
    MissingEndMarker,

    #[error("no signature line after the end marker")]
    MissingSignature,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature does not match the signed data")]
    SignatureMismatch,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("line {line}: unexpected content after the signature")]
    TrailingContent { line: usize },

    #[error("line {line}: malformed header: {reason}")]
    MalformedHeader { line: usize, reason: String },

    #[error("line {line}: malformed record: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("line {line}: unknown header key `{key}`")]
    UnknownKey { line: usize, key: String },

    #[error("trace contains no bus records")]
    EmptyTrace,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Checks trace signatures against one pre-agreed public key.
///
/// Verification is stateless, so one verifier can be shared across threads.
#[derive(Debug, Clone)]
pub struct TraceVerifier {
    key: VerifyingKey,
}

impl TraceVerifier {
    /// Creates a verifier from a raw 32-byte Ed25519 public key.
    pub fn new(public_key: &[u8]) -> Result<Self, VerificationError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] = public_key.try_into().map_err(|_| {
            VerificationError::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                public_key.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|err| VerificationError::InvalidPublicKey(err.to_string()))?;
        Ok(Self { key })
    }

    /// Reads the public key from a file holding the raw 32 bytes.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, VerificationError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| VerificationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(&bytes)
    }

    /// Reads and verifies a trace file. The trace id is the file path.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SignedTrace, VerificationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| VerificationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.verify(path.display().to_string(), &text)
    }

    /// Verifies trace text and parses its key section.
    ///
    /// The signature is checked before any record is parsed. Lines may end
    /// in `\n` or `\r\n`; the signed payload is the exact bytes from the
    /// first byte of the BEGIN marker to the last byte of the END marker.
    pub fn verify(&self, id: impl Into<String>, text: &str) -> Result<SignedTrace, VerificationError> {
        let id = id.into();
        let lines = split_lines(text);

        match lines.first() {
            Some(first) if first.text == BEGIN_MARKER => {}
            _ => return Err(VerificationError::MissingBeginMarker),
        }

        let end = lines
            .iter()
            .position(|line| line.text == END_MARKER)
            .ok_or(VerificationError::MissingEndMarker)?;
        let payload_end = lines[end].start + END_MARKER.len();
        let payload = &text.as_bytes()[..payload_end];

        let signature_line = lines
            .get(end + 1)
            .map(|line| line.text.trim())
            .filter(|text| !text.is_empty())
            .ok_or(VerificationError::MissingSignature)?;

        if let Some(extra) = lines[end + 2..]
            .iter()
            .find(|line| !line.text.trim().is_empty())
        {
            return Err(VerificationError::TrailingContent { line: extra.number });
        }

        let signature = decode_signature(signature_line)?;
        self.check_signature(payload, &signature)?;

        let (header, records) = parse_key_section(
            lines[1..end].iter().map(|line| line.text),
            lines[1].number,
        )?;
        debug!("verified trace {} ({} records)", id, records.len());

        Ok(SignedTrace {
            id,
            header,
            records,
            payload: payload.to_vec(),
            signature,
        })
    }

    /// Checks a detached signature over `payload`.
    pub fn check_signature(
        &self,
        payload: &[u8],
        signature: &[u8; SIGNATURE_LENGTH],
    ) -> Result<(), VerificationError> {
        let signature = Signature::from_bytes(signature);
        self.key
            .verify_strict(payload, &signature)
            .map_err(|_| VerificationError::SignatureMismatch)
    }
}

fn decode_signature(text: &str) -> Result<[u8; SIGNATURE_LENGTH], VerificationError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|err| VerificationError::MalformedSignature(err.to_string()))?;
    bytes.as_slice().try_into().map_err(|_| {
        VerificationError::MalformedSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            bytes.len()
        ))
    })
}

struct Line<'a> {
    /// 1-based line number.
    number: usize,
    /// Byte offset of the first character.
    start: usize,
    /// Contents without the line terminator.
    text: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let content = raw.strip_suffix('\n').unwrap_or(raw);
        let content = content.strip_suffix('\r').unwrap_or(content);
        lines.push(Line {
            number: index + 1,
            start,
            text: content,
        });
        start += raw.len();
    }
    lines
}
