use serde::{Deserialize, Serialize};

use super::token::Token;

/// Position of a line in the CodeFile arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineIndex(u32);

impl LineIndex {
    pub(crate) fn from_usize(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Change annotation written by the diff collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    #[default]
    Unchanged,
    Added,
    Removed,
    Modified,
}

impl DiffKind {
    pub fn is_unchanged(&self) -> bool {
        *self == DiffKind::Unchanged
    }
}

/// One logical row of the canonical surface
///
/// Children are arena indices owned exclusively by this line; they are set
/// only through `CodeFileBuilder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLine {
    /// Stable id used to correlate lines across revisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line_id: Option<String>,
    tokens: Vec<Token>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<LineIndex>,
    /// Line id of the line this one belongs with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    related_to: Option<String>,
    #[serde(default, skip_serializing_if = "DiffKind::is_unchanged")]
    diff_kind: DiffKind,
}

impl CodeLine {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            line_id: None,
            tokens,
            children: Vec::new(),
            related_to: None,
            diff_kind: DiffKind::Unchanged,
        }
    }

    pub fn with_id(mut self, line_id: impl Into<String>) -> Self {
        self.line_id = Some(line_id.into());
        self
    }

    pub fn related_to(mut self, line_id: impl Into<String>) -> Self {
        self.related_to = Some(line_id.into());
        self
    }

    pub fn line_id(&self) -> Option<&str> {
        self.line_id.as_deref()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn children(&self) -> &[LineIndex] {
        &self.children
    }

    pub fn related_line(&self) -> Option<&str> {
        self.related_to.as_deref()
    }

    pub fn diff_kind(&self) -> DiffKind {
        self.diff_kind
    }

    /// Concatenated token text
    pub fn display_text(&self) -> String {
        self.tokens.iter().map(Token::value).collect()
    }

    /// A line with no tokens or only whitespace
    pub fn is_blank(&self) -> bool {
        self.tokens.iter().all(Token::is_blank)
    }

    pub(crate) fn push_child(&mut self, child: LineIndex) {
        self.children.push(child);
    }

    pub(crate) fn set_diff_kind(&mut self, kind: DiffKind) {
        self.diff_kind = kind;
    }
}
