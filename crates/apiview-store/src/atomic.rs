//! Atomic write primitives
//!
//! Bytes go to a temp file beside the target and are renamed over it, so
//! readers see either the old file, the new file, or no file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{directory_not_found, io_error, Result};

/// Directory `target` lives in; an empty parent means the working directory
pub fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique per call, so concurrent writers of one target never share a temp file
fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    parent_dir(target).join(format!(
        ".{}.{}.{}.tmp",
        name,
        std::process::id(),
        sequence
    ))
}

/// Atomically write bytes to a file
///
/// The parent directory must already exist.
///
/// # Errors
///
/// Returns `DirectoryNotFound` if the parent directory is missing, or `Io`
/// if writing or renaming fails. No temp file is left behind on failure.
pub fn atomic_write(target: &Path, content: &[u8]) -> Result<()> {
    let dir = parent_dir(target);
    if !dir.is_dir() {
        return Err(directory_not_found(target));
    }

    let temp = temp_path(target);
    let written = write_synced(&temp, content).and_then(|()| {
        fs::rename(&temp, target).map_err(|e| io_error("rename_temp", e))
    });
    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| io_error("create_temp", e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_temp", e))?;
    file.sync_all().map_err(|e| io_error("sync_temp", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiview_core::errors::ApiViewError;
    use tempfile::TempDir;

    fn tmp_count(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("doc.json");

        atomic_write(&target, b"hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"hello");
        assert_eq!(tmp_count(temp_dir.path()), 0);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("doc.json");
        fs::write(&target, b"old contents that are longer").unwrap();

        atomic_write(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_missing_parent_is_directory_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("absent").join("doc.json");

        let err = atomic_write(&target, b"x").unwrap_err();

        assert!(matches!(err, ApiViewError::DirectoryNotFound { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_rename_failure_leaves_no_temp() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory in the way makes the rename fail
        let target = temp_dir.path().join("doc.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inside"), b"x").unwrap();

        assert!(atomic_write(&target, b"x").is_err());
        assert_eq!(tmp_count(temp_dir.path()), 0);
    }

    #[test]
    fn test_temp_names_differ_per_call() {
        let target = Path::new("out/doc.json");
        assert_ne!(temp_path(target), temp_path(target));
    }

    #[test]
    fn test_concurrent_writes_to_same_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("doc.json");
        let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![b'a' + i; 64 * 1024]).collect();

        let target_ref = &target;
        std::thread::scope(|scope| {
            let handles: Vec<_> = payloads
                .iter()
                .map(|payload| scope.spawn(move || atomic_write(target_ref, payload)))
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        // Exactly one writer's bytes, never a mix
        let written = fs::read(&target).unwrap();
        assert!(payloads.contains(&written));
        assert_eq!(tmp_count(temp_dir.path()), 0);
    }

    #[test]
    fn test_bare_file_name_uses_working_directory() {
        assert_eq!(parent_dir(Path::new("doc.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("out/doc.json")), Path::new("out"));
    }
}
