//! Compiled-library handle abstraction
//!
//! The builder only ever sees a library through `LibraryHandle`; the JSON
//! metadata format in [`metadata`] is the implementation the CLI feeds it.

pub mod metadata;

pub use metadata::{
    LibraryMetadata, MemberDef, MemberKind, NamespaceDef, ParameterDef, TypeDef, TypeKind,
    LIBRARY_FORMAT_VERSION,
};

use crate::errors::Result;

/// Read-only view of one compiled library
pub trait LibraryHandle {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Source-ecosystem tag written into the document
    fn language(&self) -> &str;

    /// Assemblies granted access to internals
    fn friend_assemblies(&self) -> &[String];

    /// Namespaces in metadata order
    ///
    /// # Errors
    ///
    /// Returns `Compilation` when the library cannot be analyzed at all.
    fn namespaces(&self) -> Result<&[NamespaceDef]>;
}

/// An entity the ordering providers know how to sort
pub trait Ordered {
    fn order_name(&self) -> &str;

    /// Explicit declaration position reported by the metadata, if any
    fn declaration_position(&self) -> Option<u32>;
}
