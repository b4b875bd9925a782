//! Binary snapshots of resolved decision tables.
//!
//! Build drivers that query the same configuration many times can resolve it
//! once, store the [`DecisionTable`] with [`DecisionTable::to_bytes`] and reload
//! it with [`DecisionTable::from_bytes`]. The format is a 32-byte fixed header
//! followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"BCFG"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly; the engine version is informational.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DecisionTable, ProjectDecision};

const MAGIC: &[u8; 4] = b"BCFG";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

/// Errors that can occur when serializing a [`DecisionTable`].
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode decision table: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("payload of {0} bytes does not fit the snapshot header")]
    PayloadTooLarge(usize),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`DecisionTable`].
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a buildcfg snapshot: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedTable {
    metadata: TableMetadata,
    projects: Vec<SerializedProject>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableMetadata {
    project_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedProject {
    name: String,
    enabled: bool,
    host_tests: Vec<String>,
    unit_tests: Vec<String>,
    also_build: Vec<String>,
}

fn table_to_serialized(table: &DecisionTable, source_text: Option<&str>) -> SerializedTable {
    let projects: Vec<SerializedProject> = table
        .iter()
        .map(|(name, d)| SerializedProject {
            name: name.to_owned(),
            enabled: d.enabled,
            host_tests: d.host_tests.clone(),
            unit_tests: d.unit_tests.clone(),
            also_build: d.also_build.clone(),
        })
        .collect();

    SerializedTable {
        metadata: TableMetadata {
            project_count: projects.len(),
            source_digest: source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes()),
        },
        projects,
    }
}

fn serialized_to_table(ser: SerializedTable) -> DecisionTable {
    let projects = ser
        .projects
        .into_iter()
        .map(|p| {
            (
                p.name,
                ProjectDecision {
                    enabled: p.enabled,
                    host_tests: p.host_tests,
                    unit_tests: p.unit_tests,
                    also_build: p.also_build,
                },
            )
        })
        .collect();
    DecisionTable { projects }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedTable) -> Result<(), DeserializeError> {
    if ser.metadata.project_count != ser.projects.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} projects but payload has {}",
            ser.metadata.project_count,
            ser.projects.len()
        )));
    }

    // Tables iterate in name order; anything else was not produced by encode.
    for window in ser.projects.windows(2) {
        if window[0].name >= window[1].name {
            return Err(DeserializeError::Validation(format!(
                "projects not strictly sorted: '{}' before '{}'",
                window[0].name, window[1].name
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The fixed-size prefix of a snapshot.
struct Header {
    format_version: u16,
    payload_len: u32,
    checksum: [u8; 16],
}

impl Header {
    fn for_payload(payload: &[u8]) -> Result<Self, SerializeError> {
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| SerializeError::PayloadTooLarge(payload.len()))?;
        Ok(Self {
            format_version: FORMAT_VERSION,
            payload_len,
            checksum: payload_checksum(payload),
        })
    }

    fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(MAGIC);
        out[4..6].copy_from_slice(&self.format_version.to_le_bytes());
        out[6..8].copy_from_slice(&ENGINE_VERSION.to_le_bytes());
        // 8..12: reserved flags, always zero.
        out[12..16].copy_from_slice(&self.payload_len.to_le_bytes());
        out[16..32].copy_from_slice(&self.checksum);
        out
    }

    /// Split `bytes` into a header and the payload that follows it.
    fn split(bytes: &[u8]) -> Result<(Self, &[u8]), DeserializeError> {
        let Some((head, payload)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
            return Err(DeserializeError::LengthMismatch {
                expected: HEADER_SIZE as u32,
                actual: bytes.len(),
            });
        };
        if head[0..4] != MAGIC[..] {
            return Err(DeserializeError::BadMagic);
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&head[16..32]);
        let header = Self {
            format_version: u16::from_le_bytes([head[4], head[5]]),
            payload_len: u32::from_le_bytes([head[12], head[13], head[14], head[15]]),
            checksum,
        };
        Ok((header, payload))
    }
}

fn payload_checksum(payload: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&blake3::hash(payload).as_bytes()[..16]);
    out
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    table: &DecisionTable,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = table_to_serialized(table, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;
    let header = Header::for_payload(&payload)?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.to_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode_serialized(bytes: &[u8]) -> Result<SerializedTable, DeserializeError> {
    let (header, payload) = Header::split(bytes)?;

    if header.format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: header.format_version,
            supported: FORMAT_VERSION,
        });
    }
    if payload.len() != header.payload_len as usize {
        return Err(DeserializeError::LengthMismatch {
            expected: header.payload_len,
            actual: payload.len(),
        });
    }
    if payload_checksum(payload) != header.checksum {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (ser, _): (SerializedTable, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    validate(&ser)?;
    Ok(ser)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<DecisionTable, DeserializeError> {
    decode_serialized(bytes).map(serialized_to_table)
}

/// BLAKE3 digest of the source text recorded in a snapshot, if any.
///
/// # Errors
///
/// Returns [`DeserializeError`] if the snapshot is malformed.
pub fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    decode_serialized(bytes).map(|ser| ser.metadata.source_digest)
}

/// `true` if the snapshot was produced from exactly `source_text`.
///
/// # Errors
///
/// Returns [`DeserializeError`] if the snapshot is malformed.
pub fn is_fresh(bytes: &[u8], source_text: &str) -> Result<bool, DeserializeError> {
    let expected = *blake3::hash(source_text.as_bytes()).as_bytes();
    Ok(source_digest(bytes)? == Some(expected))
}

impl DecisionTable {
    /// Serialize this table to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded so callers
    /// can tell when the configuration changed and the snapshot is stale.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] if encoding fails.
    pub fn to_bytes(&self, source_text: Option<&str>) -> Result<Vec<u8>, SerializeError> {
        encode(self, source_text)
    }

    /// Deserialize a table previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializeError> {
        decode(bytes)
    }

    /// Serialize this table and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] on encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the table it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`] on I/O, format, integrity, or validation
    /// failure.
    pub fn from_binary_file(path: impl AsRef<std::path::Path>) -> Result<Self, DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}
