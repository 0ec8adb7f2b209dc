//! Persisted document files
//!
//! Writes go through [`atomic_write`], so a failed write never leaves a
//! partial document behind; reads decode the whole file or nothing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use apiview_core::{codec, CodeFile};
use apiview_core::{log_op_end, log_op_error, log_op_start};

use crate::atomic::atomic_write;
use crate::errors::{read_error, Result};

/// Serialize `file` to `path` atomically, returning its digest
///
/// # Errors
///
/// Returns `DirectoryNotFound` if the output directory is missing,
/// `Serialization` if encoding fails, or `Io` if the write fails.
pub fn write_document(path: &Path, file: &CodeFile) -> Result<String> {
    let path_display = path.display().to_string();
    log_op_start!("write_document", path = %path_display);
    let start = std::time::Instant::now();

    let bytes = codec::to_canonical_bytes(file)
        .and_then(|bytes| atomic_write(path, &bytes).map(|()| bytes))
        .map_err(|e| {
            log_op_error!(
                "write_document",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                path = %path_display
            );
            e
        })?;
    let digest = codec::hash_bytes(&bytes);

    log_op_end!(
        "write_document",
        duration_ms = start.elapsed().as_millis() as u64,
        path = %path_display,
        bytes = bytes.len(),
        digest = %digest
    );
    Ok(digest)
}

/// Read and validate the document stored at `path`
///
/// # Errors
///
/// Returns `FileNotFound` if `path` does not exist, `Io` if it cannot be
/// read, or `Deserialization` if its content is not a valid document.
pub fn read_document(path: &Path) -> Result<CodeFile> {
    let handle = File::open(path).map_err(|e| read_error(path, "read_document", e))?;
    codec::deserialize(&mut BufReader::new(handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiview_core::errors::ApiViewError;
    use apiview_core::model::{CodeFileBuilder, CodeLine, Token};
    use tempfile::TempDir;

    fn sample() -> CodeFile {
        let mut b = CodeFileBuilder::new("C#").package("Sample", "1.0.0");
        let ns = b.add_root(CodeLine::new(vec![Token::keyword("namespace")]).with_id("N:Sample"));
        b.add_child(ns, CodeLine::new(vec![Token::text("class A { }")]).with_id("T:Sample.A"))
            .unwrap();
        b.nest_section("N:Sample", ns, false);
        b.finish().unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.json");

        let digest = write_document(&path, &sample()).unwrap();

        assert_eq!(read_document(&path).unwrap(), sample());
        assert_eq!(digest, codec::document_digest(&sample()).unwrap());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ApiViewError::FileNotFound { .. }));
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("sample.json");

        let err = write_document(&path, &sample()).unwrap_err();

        assert!(matches!(err, ApiViewError::DirectoryNotFound { .. }));
        assert!(!path.exists());
    }
}
