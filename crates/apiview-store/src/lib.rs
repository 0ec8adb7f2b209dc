//! APIView Store - filesystem boundary for documents and libraries
//!
//! Provides:
//! - Atomic file writes (temp file in the target directory, then rename)
//! - Persisted document read/write through the core codec
//! - Library loading keyed by content digest, shared through a
//!   single-flight cache

pub mod atomic;
pub mod document_file;
pub mod errors;
pub mod library_loader;

pub use document_file::{read_document, write_document};
pub use errors::Result;
pub use library_loader::LibraryLoader;
