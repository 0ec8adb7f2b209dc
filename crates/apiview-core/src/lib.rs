//! APIView Core - canonical API surface documents
//!
//! This crate turns a compiled library's metadata into a canonical, ordered,
//! tokenized document of its public surface and renders that document into
//! numbered display lines with an addressable section index:
//! - Library handle abstraction and the JSON metadata format
//! - Pluggable ordering providers (declaration order, ordinal name order)
//! - Surface builder with friend-access header and pass-through formatting
//! - CodeFile arena model with validated construction and deserialization
//! - Section renderer producing `RenderedView`s
//! - Deterministic codec and document digests
//! - Single-flight cache for analyzed libraries

pub mod builder;
pub mod cache;
pub mod codec;
pub mod config;
pub mod errors;
pub mod library;
pub mod logging_facility;
pub mod model;
pub mod ordering;
pub mod render;

// Canonical log field names, used by the logging macros
pub use apiview_core_types::schema;

// Re-export commonly used types
pub use builder::{build_surface, SurfaceBuilder};
pub use cache::SingleFlightCache;
pub use codec::{deserialize, document_digest, serialize};
pub use config::Config;
pub use errors::{ApiViewError, ExError, ExErrorKind, Result};
pub use library::{LibraryHandle, LibraryMetadata};
pub use model::{CodeFile, CodeFileBuilder, CodeLine, LineIndex, Section, Token, TokenKind};
pub use ordering::{DeclarationOrder, NameOrder, OrderingKind, OrderingProvider};
pub use render::{render, RenderedView};
