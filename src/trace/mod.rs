//! # Signed Bus Traces
//!
//! A ChipLab trace is a plain-text file recorded from a real 65C02:
//!
//! ```text
//! ===BEGIN SIGNED DATA===
//! InputSha256=<base64 sha256 of the program image>
//! a=0xFFFC rwb=1 vpb=0
//! a=0xFFFD rwb=1 vpb=0
//! a=0x8000 rwb=1 sync=1
//! a=0x0010 rwb=0 d=0xCA
//! ===END SIGNED DATA===
//! <base64 Ed25519 signature>
//! ```
//!
//! The key section (both marker lines and everything between them) is the
//! signed payload. Header lines (`key=value`) come first; the first line
//! starting with `a=` begins the bus records. Record values are `0x` hex or
//! decimal.
//!
//! [`TraceVerifier`] checks the signature before anything inside the key
//! section is parsed, so a [`SignedTrace`] only ever holds authenticated
//! data.

mod verify;

pub use verify::{TraceVerifier, VerificationError};

use std::fmt;

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::bus::{BusFlags, Direction};

/// First line of the signed key section.
pub const BEGIN_MARKER: &str = "===BEGIN SIGNED DATA===";
/// Last line of the signed key section.
pub const END_MARKER: &str = "===END SIGNED DATA===";
/// Header key holding the base64 SHA-256 of the program image.
pub const INPUT_SHA256_KEY: &str = "InputSha256";

const ALLOWED_KEYS: &[&str] = &[INPUT_SHA256_KEY];

/// Base64 SHA-256 of a program image, in the form `InputSha256` uses.
pub fn image_checksum(image: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(Sha256::digest(image))
}

/// One reference bus cycle from a trace.
///
/// Pins are stored in their logical sense: `vector_pull` is true when the
/// record has `vpb=0`, `memory_lock` when it has `mlb=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// 1-based line number in the trace file.
    pub line: usize,
    pub address: u16,
    pub direction: Direction,
    pub data: Option<u8>,
    pub sync: Option<bool>,
    pub vector_pull: Option<bool>,
    pub memory_lock: Option<bool>,
    /// Explicit cycle index, when the capture recorded one.
    pub cycle: Option<u64>,
}

impl TraceRecord {
    /// Parses a record line such as `a=0x8000 rwb=1 d=0xEA sync=1`.
    pub fn parse(line: usize, text: &str) -> Result<Self, VerificationError> {
        let malformed = |reason: String| VerificationError::MalformedRecord { line, reason };

        let mut address = None;
        let mut direction = None;
        let mut record = TraceRecord {
            line,
            address: 0,
            direction: Direction::Read,
            data: None,
            sync: None,
            vector_pull: None,
            memory_lock: None,
            cycle: None,
        };

        for field in text.split_whitespace() {
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| malformed(format!("field `{}` is not key=value", field)))?;
            let number =
                parse_number(value).ok_or_else(|| malformed(format!("bad value in `{}`", field)))?;

            let duplicate = match key {
                "a" => address.replace(to_u16(number).ok_or_else(|| {
                    malformed(format!("address {} does not fit in 16 bits", value))
                })?)
                .is_some(),
                "rwb" => direction.replace(pin(number, key, &malformed)?).is_some(),
                "d" => record
                    .data
                    .replace(u8::try_from(number).map_err(|_| {
                        malformed(format!("data {} does not fit in 8 bits", value))
                    })?)
                    .is_some(),
                "sync" => record.sync.replace(pin(number, key, &malformed)?).is_some(),
                "vpb" => record
                    .vector_pull
                    .replace(!pin(number, key, &malformed)?)
                    .is_some(),
                "mlb" => record
                    .memory_lock
                    .replace(!pin(number, key, &malformed)?)
                    .is_some(),
                "c" => record.cycle.replace(number).is_some(),
                _ => return Err(malformed(format!("unknown field `{}`", key))),
            };
            if duplicate {
                return Err(malformed(format!("field `{}` repeated", key)));
            }
        }

        record.address = address.ok_or_else(|| malformed("missing `a`".to_string()))?;
        let rwb = direction.ok_or_else(|| malformed("missing `rwb`".to_string()))?;
        record.direction = if rwb {
            Direction::Read
        } else {
            Direction::Write
        };
        Ok(record)
    }

    /// The status pins this record asserts, for the pins it recorded.
    pub fn recorded_flags(&self) -> (BusFlags, BusFlags) {
        let mut recorded = BusFlags::empty();
        let mut asserted = BusFlags::empty();
        for (value, flag) in [
            (self.sync, BusFlags::SYNC),
            (self.vector_pull, BusFlags::VECTOR_PULL),
            (self.memory_lock, BusFlags::MEMORY_LOCK),
        ] {
            if let Some(active) = value {
                recorded |= flag;
                asserted.set(flag, active);
            }
        }
        (recorded, asserted)
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "a=0x{:04X} rwb={}",
            self.address,
            self.direction.rwb()
        )?;
        if let Some(data) = self.data {
            write!(f, " d=0x{:02X}", data)?;
        }
        if let Some(sync) = self.sync {
            write!(f, " sync={}", sync as u8)?;
        }
        if let Some(vector_pull) = self.vector_pull {
            write!(f, " vpb={}", !vector_pull as u8)?;
        }
        if let Some(memory_lock) = self.memory_lock {
            write!(f, " mlb={}", !memory_lock as u8)?;
        }
        if let Some(cycle) = self.cycle {
            write!(f, " c={}", cycle)?;
        }
        Ok(())
    }
}

fn parse_number(text: &str) -> Option<u64> {
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn to_u16(number: u64) -> Option<u16> {
    u16::try_from(number).ok()
}

fn pin<F>(number: u64, key: &str, malformed: &F) -> Result<bool, VerificationError>
where
    F: Fn(String) -> VerificationError,
{
    match number {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(malformed(format!("`{}` must be 0 or 1", key))),
    }
}

/// An authenticated ChipLab trace.
///
/// Created only by [`TraceVerifier`]; read-only afterwards.
#[derive(Debug, Clone)]
pub struct SignedTrace {
    id: String,
    header: Vec<(String, String)>,
    records: Vec<TraceRecord>,
    payload: Vec<u8>,
    signature: [u8; 64],
}

impl SignedTrace {
    /// Trace identifier (usually the file path).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header value for `key`, if present.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header entries in file order.
    pub fn header_entries(&self) -> &[(String, String)] {
        &self.header
    }

    /// The `InputSha256` header value.
    pub fn input_sha256(&self) -> Option<&str> {
        self.header(INPUT_SHA256_KEY)
    }

    /// Reference bus cycles in order.
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The exact signed bytes, from the BEGIN marker through the END marker.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }

    /// Checks the stored payload against the stored signature again.
    pub fn reverify(&self, verifier: &TraceVerifier) -> Result<(), VerificationError> {
        verifier.check_signature(&self.payload, &self.signature)
    }
}

/// Parses the lines strictly between the markers into header entries and
/// records. `first_line` is the file line number of the first of them.
fn parse_key_section<'a, I>(
    lines: I,
    first_line: usize,
) -> Result<(Vec<(String, String)>, Vec<TraceRecord>), VerificationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut header = Vec::new();
    let mut records = Vec::new();

    for (offset, text) in lines.into_iter().enumerate() {
        let line = first_line + offset;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        if text.starts_with("a=") {
            records.push(TraceRecord::parse(line, text)?);
            continue;
        }

        if !records.is_empty() {
            return Err(VerificationError::MalformedRecord {
                line,
                reason: format!("expected a bus record, found `{}`", text),
            });
        }

        let (key, value) = text
            .split_once('=')
            .ok_or_else(|| VerificationError::MalformedHeader {
                line,
                reason: format!("`{}` is not key=value", text),
            })?;
        if !ALLOWED_KEYS.contains(&key) {
            return Err(VerificationError::UnknownKey {
                line,
                key: key.to_string(),
            });
        }
        header.push((key.to_string(), value.to_string()));
    }

    if records.is_empty() {
        return Err(VerificationError::EmptyTrace);
    }
    Ok((header, records))
}
