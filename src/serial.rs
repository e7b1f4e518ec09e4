//! Binary cache for compiled rule sets.
//!
//! Forms with large rule documents can skip JSON decoding by caching the
//! compiled [`RuleSet`](crate::RuleSet) as a blob:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     b"FGRS"
//! 4       2     format version (u16 LE)
//! 6       2     flags (u16 LE, bit 0: source digest present)
//! 8       4     conditional count (u32 LE)
//! 12      4     payload length (u32 LE)
//! 16      16    BLAKE3 of the payload, first 16 bytes
//! 32..          bincode payload
//! ```
//!
//! Loading checks the header, the checksum and the conditional count, then
//! compiles the decoded conditionals again so a blob can never carry a rule
//! set the builder would reject.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Conditional, Field, RuleSet, RuleSetError};

const MAGIC: &[u8; 4] = b"FGRS";
const FORMAT_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;
const FLAG_SOURCE_DIGEST: u16 = 1;

/// Failure writing a [`RuleSet`](crate::RuleSet) blob.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("cannot encode rule set: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("cannot write rule set blob: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what} ({len}) does not fit the blob header")]
    TooLarge { what: &'static str, len: usize },
}

/// Failure reading a [`RuleSet`](crate::RuleSet) blob.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a fieldgate rule set blob")]
    BadMagic,

    #[error("blob format v{blob} is not supported (expected v{supported})")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("blob payload does not match its checksum")]
    ChecksumMismatch,

    #[error("blob is truncated: needs {expected} bytes, has {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("cannot decode rule set payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("inconsistent blob: {0}")]
    Validation(String),

    #[error("blob holds an invalid rule set: {0}")]
    RuleSet(#[from] RuleSetError),

    #[error("cannot read rule set blob: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    version: u16,
    flags: u16,
    conditionals: u32,
    payload_len: u32,
    checksum: [u8; 16],
}

impl Header {
    fn describe(
        payload: &[u8],
        conditionals: usize,
        has_digest: bool,
    ) -> Result<Self, SerializeError> {
        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&blake3::hash(payload).as_bytes()[..16]);
        Ok(Self {
            version: FORMAT_VERSION,
            flags: if has_digest { FLAG_SOURCE_DIGEST } else { 0 },
            conditionals: header_u32("conditional count", conditionals)?,
            payload_len: header_u32("payload length", payload.len())?,
            checksum,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.conditionals.to_le_bytes());
        out.extend_from_slice(&self.payload_len.to_le_bytes());
        out.extend_from_slice(&self.checksum);
    }

    fn read(bytes: &[u8]) -> Result<Self, DeserializeError> {
        let Some(head) = bytes.get(..HEADER_SIZE) else {
            return Err(DeserializeError::LengthMismatch {
                expected: 32,
                actual: bytes.len(),
            });
        };
        if &head[..4] != MAGIC {
            return Err(DeserializeError::BadMagic);
        }
        let u16_at = |at: usize| u16::from_le_bytes([head[at], head[at + 1]]);
        let u32_at = |at: usize| u32::from_le_bytes([head[at], head[at + 1], head[at + 2], head[at + 3]]);
        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&head[16..]);
        Ok(Self {
            version: u16_at(4),
            flags: u16_at(6),
            conditionals: u32_at(8),
            payload_len: u32_at(12),
            checksum,
        })
    }
}

fn header_u32(what: &'static str, len: usize) -> Result<u32, SerializeError> {
    u32::try_from(len).map_err(|_| SerializeError::TooLarge { what, len })
}

/// Everything a compiled rule set is rebuilt from.
#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    source_digest: Option<[u8; 32]>,
    fields: Vec<Field>,
    conditionals: Vec<Conditional>,
}

impl Payload {
    fn capture(ruleset: &RuleSet, source_text: Option<&str>) -> Self {
        Self {
            source_digest: source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes()),
            fields: ruleset.fields.iter().cloned().collect(),
            conditionals: ruleset.conditionals.iter().map(|c| c.conditional.clone()).collect(),
        }
    }

    fn rebuild(self, header: &Header) -> Result<RuleSet, DeserializeError> {
        if header.conditionals as usize != self.conditionals.len() {
            return Err(DeserializeError::Validation(format!(
                "header lists {} conditionals, payload holds {}",
                header.conditionals,
                self.conditionals.len()
            )));
        }
        if (header.flags & FLAG_SOURCE_DIGEST != 0) != self.source_digest.is_some() {
            return Err(DeserializeError::Validation(
                "source digest flag disagrees with payload".into(),
            ));
        }
        Ok(crate::compile::compile(self.fields, self.conditionals)?)
    }
}

/// Check the header and checksum and hand back the decoded payload.
fn open(bytes: &[u8]) -> Result<(Header, Payload), DeserializeError> {
    let header = Header::read(bytes)?;
    if header.version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: header.version,
            supported: FORMAT_VERSION,
        });
    }

    let body = &bytes[HEADER_SIZE..];
    let Some(payload) = body.get(..header.payload_len as usize) else {
        return Err(DeserializeError::LengthMismatch {
            expected: header.payload_len,
            actual: body.len(),
        });
    };
    if blake3::hash(payload).as_bytes()[..16] != header.checksum {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (decoded, _) = bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok((header, decoded))
}

/// BLAKE3 digest of the JSON source passed to
/// [`RuleSet::to_bytes`](crate::RuleSet::to_bytes), if one was embedded.
/// Compare it against the current document to decide whether a cached blob
/// is stale.
///
/// # Errors
///
/// Returns [`DeserializeError`] if the blob is malformed.
pub fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    let (_, payload) = open(bytes)?;
    Ok(payload.source_digest)
}

pub(crate) fn encode(
    ruleset: &RuleSet,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let captured = Payload::capture(ruleset, source_text);
    let payload = bincode::serde::encode_to_vec(&captured, bincode::config::standard())?;
    let header = Header::describe(
        &payload,
        captured.conditionals.len(),
        captured.source_digest.is_some(),
    )?;

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.write(&mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RuleSet, DeserializeError> {
    let (header, payload) = open(bytes)?;
    payload.rebuild(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_payload() -> Payload {
        Payload {
            source_digest: None,
            fields: Vec::new(),
            conditionals: Vec::new(),
        }
    }

    #[test]
    fn header_survives_write_and_read() {
        let header = Header::describe(b"payload bytes", 4, true).unwrap();
        let mut buf = Vec::new();
        header.write(&mut buf);
        assert_eq!(buf.len(), HEADER_SIZE);

        let read = Header::read(&buf).unwrap();
        assert_eq!(read, header);
        assert_eq!(read.flags, FLAG_SOURCE_DIGEST);
        assert_eq!(read.payload_len, 13);
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[..4].copy_from_slice(b"PNG\0");
        assert!(matches!(Header::read(&buf), Err(DeserializeError::BadMagic)));
    }

    #[test]
    fn short_header_is_truncated() {
        assert!(matches!(
            Header::read(&[0u8; 10]),
            Err(DeserializeError::LengthMismatch { expected: 32, actual: 10 })
        ));
    }

    #[test]
    fn conditional_count_must_match() {
        let header = Header::describe(&[], 3, false).unwrap();
        assert!(matches!(
            empty_payload().rebuild(&header),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn digest_flag_must_match() {
        let header = Header::describe(&[], 0, true).unwrap();
        assert!(matches!(
            empty_payload().rebuild(&header),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn decoded_conditionals_are_revalidated() {
        let duplicate = Conditional {
            id: "con_1".into(),
            name: "n".into(),
            action: None,
            group: Vec::new(),
            targets: Vec::new(),
        };
        let payload = Payload {
            conditionals: vec![duplicate.clone(), duplicate],
            ..empty_payload()
        };
        let header = Header::describe(&[], 2, false).unwrap();
        assert!(matches!(
            payload.rebuild(&header),
            Err(DeserializeError::RuleSet(RuleSetError::DuplicateConditional { .. }))
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_lengths_are_refused() {
        let len = u32::MAX as usize + 1;
        let err = header_u32("payload length", len).unwrap_err();
        assert!(matches!(err, SerializeError::TooLarge { what: "payload length", len: l } if l == len));
        assert_eq!(header_u32("payload length", 7).unwrap(), 7);
    }
}
