//! Library loading with per-content single-flight analysis
//!
//! Libraries are identified by the SHA-256 of their bytes, so the same
//! library reached through different paths is parsed once and shared.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use apiview_core::codec::hash_bytes;
use apiview_core::{log_op_end, log_op_error, log_op_start};
use apiview_core::{LibraryMetadata, SingleFlightCache};

use crate::errors::{read_error, Result};

#[derive(Debug, Default)]
pub struct LibraryLoader {
    cache: SingleFlightCache<String, LibraryMetadata>,
}

impl LibraryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the library stored at `path`
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if `path` does not exist, `Io` if it cannot be
    /// read, or `Compilation` if its content is not analyzable metadata.
    pub fn load(&self, path: &Path) -> Result<Arc<LibraryMetadata>> {
        let path_display = path.display().to_string();
        log_op_start!("load_library", path = %path_display);
        let start = std::time::Instant::now();

        let library = self.load_impl(path, &path_display).map_err(|e| {
            log_op_error!(
                "load_library",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                path = %path_display
            );
            e
        })?;

        log_op_end!(
            "load_library",
            duration_ms = start.elapsed().as_millis() as u64,
            path = %path_display,
            library = library.name.as_str()
        );
        Ok(library)
    }

    fn load_impl(&self, path: &Path, display: &str) -> Result<Arc<LibraryMetadata>> {
        let bytes = fs::read(path).map_err(|e| read_error(path, "read_library", e))?;
        self.load_bytes(&bytes, display)
    }

    /// Analyze in-memory library bytes; `origin` names them in errors
    ///
    /// # Errors
    ///
    /// Returns `Compilation` if the bytes are not analyzable metadata.
    pub fn load_bytes(&self, bytes: &[u8], origin: &str) -> Result<Arc<LibraryMetadata>> {
        self.cache
            .get_or_build(hash_bytes(bytes), || LibraryMetadata::from_slice(bytes, origin))
    }

    /// Forget every analyzed library
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of analyzed libraries held
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
