//! File-backed registry persisted as a checksummed binary snapshot.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"RDCK"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Reserved (u16)
//! 8       4     Payload length in bytes (u32, little-endian)
//! 12      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 28..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly. The whole file is rewritten after
//! every mutation: the new snapshot goes to a sibling temp file that is then
//! renamed over the old one.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{MemoryRegistry, Registry, StoreError};
use crate::{Expr, NamedRule};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"RDCK";
const FORMAT_VERSION: u16 = 1;
const HEADER_SIZE: usize = 28;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors raised while encoding or decoding a snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("not a ruledeck snapshot: invalid magic bytes")]
    BadMagic,

    #[error("incompatible snapshot version: file is v{found}, engine supports v{supported}")]
    IncompatibleVersion { found: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode snapshot payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRegistry {
    metadata: SnapshotMetadata,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMetadata {
    rule_count: usize,
    sequence: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    id: String,
    tree: String,
    created_at_millis: i64,
}

fn validate(ser: &SerializedRegistry) -> Result<(), SnapshotError> {
    if ser.metadata.rule_count != ser.rules.len() {
        return Err(SnapshotError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count,
            ser.rules.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ser.rules.len());
    for rule in &ser.rules {
        if rule.id.is_empty() {
            return Err(SnapshotError::Validation("empty rule id".to_owned()));
        }
        if !seen.insert(rule.id.as_str()) {
            return Err(SnapshotError::Validation(format!(
                "rule id '{}' appears more than once",
                rule.id
            )));
        }
    }
    Ok(())
}

fn to_named(rule: SerializedRule) -> Result<NamedRule, SnapshotError> {
    let created_at = DateTime::<Utc>::from_timestamp_millis(rule.created_at_millis)
        .ok_or_else(|| {
            SnapshotError::Validation(format!(
                "rule '{}' has an out-of-range timestamp {}",
                rule.id, rule.created_at_millis
            ))
        })?;
    Ok(NamedRule {
        id: rule.id,
        tree: rule.tree,
        created_at,
    })
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes());
    #[allow(clippy::cast_possible_truncation)] // snapshots stay far below 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash.as_bytes()[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 28
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), SnapshotError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SnapshotError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[12..HEADER_SIZE]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(rules: &[NamedRule], sequence: u64) -> Result<Vec<u8>, SnapshotError> {
    let serialized = SerializedRegistry {
        metadata: SnapshotMetadata {
            rule_count: rules.len(),
            sequence,
        },
        rules: rules
            .iter()
            .map(|r| SerializedRule {
                id: r.id.clone(),
                tree: r.tree.clone(),
                created_at_millis: r.created_at.timestamp_millis(),
            })
            .collect(),
    };
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<(Vec<NamedRule>, u64), SnapshotError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(SnapshotError::IncompatibleVersion {
            found: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != payload_len as usize {
        return Err(SnapshotError::LengthMismatch {
            expected: payload_len,
            actual: payload.len(),
        });
    }

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(SnapshotError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRegistry, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    validate(&serialized)?;

    let sequence = serialized.metadata.sequence;
    let rules = serialized
        .rules
        .into_iter()
        .map(to_named)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((rules, sequence))
}

// ---------------------------------------------------------------------------
// SnapshotRegistry
// ---------------------------------------------------------------------------

/// A [`MemoryRegistry`] mirrored to a snapshot file.
///
/// Every mutation is staged on a copy, written to disk and only then made
/// visible, so a failed write leaves both the file and the in-memory state
/// as they were.
#[derive(Debug)]
pub struct SnapshotRegistry {
    inner: MemoryRegistry,
    path: PathBuf,
}

impl SnapshotRegistry {
    /// Open the snapshot at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read, fails any snapshot
    /// check, or holds a tree that does not decode.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = match fs::read(&path) {
            Ok(bytes) => {
                let (rules, sequence) = decode(&bytes)?;
                MemoryRegistry::restore(rules, sequence)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => MemoryRegistry::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), rules = inner.len(), "opened rule snapshot");
        Ok(Self { inner, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, staged: &MemoryRegistry) -> Result<(), StoreError> {
        let bytes = encode(&staged.rules(), staged.sequence())?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    fn commit(&mut self, staged: MemoryRegistry) -> Result<(), StoreError> {
        self.persist(&staged)?;
        self.inner = staged;
        Ok(())
    }
}

impl Registry for SnapshotRegistry {
    fn lookup_by_content(&self, expr: &Expr) -> Option<String> {
        self.inner.lookup_by_content(expr)
    }

    fn next_identifier(&self) -> String {
        self.inner.next_identifier()
    }

    fn insert(&mut self, rule: NamedRule) -> Result<(), StoreError> {
        let mut staged = self.inner.clone();
        staged.insert(rule)?;
        self.commit(staged)
    }

    fn fetch(&self, id: &str) -> Option<NamedRule> {
        self.inner.fetch(id)
    }

    fn clear_all(&mut self) -> Result<(), StoreError> {
        self.commit(MemoryRegistry::new())
    }

    fn rules(&self) -> Vec<NamedRule> {
        self.inner.rules()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
