//! Persisted document codec
//!
//! Documents are stored as compact JSON produced straight from the model's
//! serde derives. Field order is fixed by the struct definitions and every
//! collection is a `Vec`, so the same logical document always encodes to
//! the same bytes.
//!
//! ## Guarantees
//!
//! - `deserialize(serialize(doc)) == doc`
//! - re-serializing a decoded document is byte-identical
//! - decoding validates the whole arena before returning; a corrupt stream
//!   never yields a partial document

use std::io::{Read, Write};

use sha2::{Digest, Sha256};

use crate::errors::{ApiViewError, Result};
use crate::model::CodeFile;
use crate::{log_op_end, log_op_error, log_op_start};

/// Canonical bytes of `file`
///
/// # Errors
///
/// Returns `Serialization` if JSON encoding fails.
pub fn to_canonical_bytes(file: &CodeFile) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(file)?)
}

/// Encode `file` into `writer` and flush it
///
/// # Errors
///
/// Returns `Serialization` if encoding fails or `Io` if the writer does.
pub fn serialize<W: Write>(file: &CodeFile, writer: &mut W) -> Result<()> {
    log_op_start!("serialize");
    let start = std::time::Instant::now();

    let result = serialize_impl(file, writer);
    match &result {
        Ok(bytes) => {
            log_op_end!(
                "serialize",
                duration_ms = start.elapsed().as_millis() as u64,
                bytes = *bytes
            );
        }
        Err(e) => {
            log_op_error!(
                "serialize",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result.map(|_| ())
}

fn serialize_impl<W: Write>(file: &CodeFile, writer: &mut W) -> Result<usize> {
    let bytes = to_canonical_bytes(file)?;
    writer
        .write_all(&bytes)
        .map_err(|e| ApiViewError::io("serialize", e))?;
    writer
        .flush()
        .map_err(|e| ApiViewError::io("serialize", e))?;
    Ok(bytes.len())
}

/// Decode a document from `reader`, draining it fully
///
/// # Errors
///
/// Returns `Io` if reading fails, or `Deserialization` if the bytes are not
/// a valid document of the current schema version.
pub fn deserialize<R: Read>(reader: &mut R) -> Result<CodeFile> {
    log_op_start!("deserialize");
    let start = std::time::Instant::now();

    let result = deserialize_impl(reader);
    match &result {
        Ok(file) => {
            log_op_end!(
                "deserialize",
                duration_ms = start.elapsed().as_millis() as u64,
                line_count = file.lines().len(),
                section_count = file.sections().len()
            );
        }
        Err(e) => {
            log_op_error!(
                "deserialize",
                e,
                duration_ms = start.elapsed().as_millis() as u64
            );
        }
    }
    result
}

fn deserialize_impl<R: Read>(reader: &mut R) -> Result<CodeFile> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ApiViewError::io("deserialize", e))?;
    from_slice(&bytes)
}

/// Decode a document from bytes
///
/// # Errors
///
/// Returns `Deserialization` for corrupt or schema-mismatched input.
pub fn from_slice(bytes: &[u8]) -> Result<CodeFile> {
    serde_json::from_slice(bytes).map_err(|e| ApiViewError::Deserialization {
        message: e.to_string(),
    })
}

/// SHA-256 hex digest of the canonical encoding
///
/// # Errors
///
/// Returns `Serialization` if JSON encoding fails.
pub fn document_digest(file: &CodeFile) -> Result<String> {
    let bytes = to_canonical_bytes(file)?;
    Ok(hash_bytes(&bytes))
}

/// Hex SHA-256 of arbitrary bytes
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
