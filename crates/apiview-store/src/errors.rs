//! Error helpers for apiview-store
//!
//! Store operations report through the core `ApiViewError`; these helpers
//! classify filesystem failures by the path they concern.

use std::io::ErrorKind;
use std::path::Path;

use apiview_core::errors::ApiViewError;

pub use apiview_core::errors::Result;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ApiViewError {
    ApiViewError::io(operation, err)
}

/// Failure reading an input file; a missing file is `FileNotFound`
pub fn read_error(path: &Path, operation: &str, err: std::io::Error) -> ApiViewError {
    if err.kind() == ErrorKind::NotFound {
        ApiViewError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        io_error(operation, err)
    }
}

/// The directory an output file would land in does not exist
pub fn directory_not_found(path: &Path) -> ApiViewError {
    ApiViewError::DirectoryNotFound {
        path: path.display().to_string(),
    }
}
