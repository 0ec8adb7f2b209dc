//! Canonical token tree
//!
//! `Token` → `CodeLine` → `CodeFile`, plus the `Section`s addressing runs of
//! lines. The arena layout lets a detached section reference lines without
//! owning them.

pub mod code_file;
pub mod line;
pub mod section;
pub mod token;

pub use code_file::{CodeFile, CodeFileBuilder, DOCUMENT_SCHEMA_VERSION};
pub use line::{CodeLine, DiffKind, LineIndex};
pub use section::{Section, SectionShape};
pub use token::{Token, TokenKind};

/// Spaces per nesting level in emitted indentation tokens
pub const INDENT_WIDTH: usize = 4;
