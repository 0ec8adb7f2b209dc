use serde::{Deserialize, Serialize};

/// Classification of a displayable token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Punctuation,
    TypeName,
    MemberName,
    Literal,
    Comment,
    Whitespace,
    Annotation,
    Text,
}

/// Smallest displayable unit of a line
///
/// Tokens are immutable once emitted: fields are private and only readable
/// through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    value: String,
    /// Line id of the entity this token refers to (hyperlink target)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    navigate_to: Option<String>,
    /// Formatting-only token excluded from semantic comparison
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    skip_diff: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            navigate_to: None,
            skip_diff: false,
        }
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Keyword, value)
    }

    pub fn punctuation(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Punctuation, value)
    }

    pub fn type_name(value: impl Into<String>) -> Self {
        Self::new(TokenKind::TypeName, value)
    }

    pub fn member_name(value: impl Into<String>) -> Self {
        Self::new(TokenKind::MemberName, value)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Literal, value)
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Comment, value)
    }

    pub fn annotation(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Annotation, value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Text, value)
    }

    /// A single space separating two semantic tokens
    pub fn space() -> Self {
        Self::new(TokenKind::Whitespace, " ")
    }

    /// Leading indentation; formatting only, so it never takes part in diffs
    pub fn indent(depth: usize) -> Self {
        Self::new(TokenKind::Whitespace, " ".repeat(depth * super::INDENT_WIDTH)).skip_diff()
    }

    /// Attach a navigation target
    pub fn navigate_to(mut self, target: impl Into<String>) -> Self {
        self.navigate_to = Some(target.into());
        self
    }

    /// Mark as formatting-only
    pub fn skip_diff(mut self) -> Self {
        self.skip_diff = true;
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn navigation_target(&self) -> Option<&str> {
        self.navigate_to.as_deref()
    }

    pub fn is_skip_diff(&self) -> bool {
        self.skip_diff
    }

    /// True for whitespace tokens and tokens with only whitespace text
    pub fn is_blank(&self) -> bool {
        self.kind == TokenKind::Whitespace || self.value.trim().is_empty()
    }
}
