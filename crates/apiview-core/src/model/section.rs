use serde::{Deserialize, Serialize};

use super::line::LineIndex;

/// How a section's content relates to the line tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionShape {
    /// Content is the heading line's children subtree
    Nested { heading: LineIndex },
    /// Content lines sit outside parent/child containment and are only
    /// reachable through the section; rendered right after the anchor's
    /// own subtree
    Detached {
        anchor: LineIndex,
        lines: Vec<LineIndex>,
    },
}

/// A named, independently addressable run of lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    key: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    collapsed: bool,
    shape: SectionShape,
}

impl Section {
    pub fn nested(key: impl Into<String>, heading: LineIndex, collapsed: bool) -> Self {
        Self {
            key: key.into(),
            collapsed,
            shape: SectionShape::Nested { heading },
        }
    }

    pub fn detached(
        key: impl Into<String>,
        anchor: LineIndex,
        lines: Vec<LineIndex>,
        collapsed: bool,
    ) -> Self {
        Self {
            key: key.into(),
            collapsed,
            shape: SectionShape::Detached { anchor, lines },
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn shape(&self) -> &SectionShape {
        &self.shape
    }

    pub fn is_detached(&self) -> bool {
        matches!(self.shape, SectionShape::Detached { .. })
    }

    /// The heading line (nested) or anchor line (detached)
    pub fn heading(&self) -> LineIndex {
        match &self.shape {
            SectionShape::Nested { heading } => *heading,
            SectionShape::Detached { anchor, .. } => *anchor,
        }
    }
}
