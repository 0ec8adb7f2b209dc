use std::collections::BTreeMap;

use crate::errors::{ApiViewError, Result};
use crate::model::{CodeLine, LineIndex};

/// Inclusive, 1-based range of display line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SectionRange {
    pub first: usize,
    pub last: usize,
}

impl SectionRange {
    pub fn contains(&self, number: usize) -> bool {
        self.first <= number && number <= self.last
    }

    pub fn line_count(&self) -> usize {
        self.last - self.first + 1
    }

    /// True if `other` lies entirely inside this range
    pub fn encloses(&self, other: &SectionRange) -> bool {
        self.first <= other.first && other.last <= self.last
    }
}

/// A flattened line with its absolute display number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedLine<'a> {
    pub number: usize,
    pub index: LineIndex,
    pub line: &'a CodeLine,
}

impl RenderedLine<'_> {
    pub fn text(&self) -> String {
        self.line.display_text()
    }
}

/// Index entry for one non-empty section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedSection<'a> {
    pub key: &'a str,
    /// Heading (nested) or anchor (detached) line number
    pub heading: usize,
    pub range: SectionRange,
    pub collapsed: bool,
    pub detached: bool,
}

/// Materialized output of the section renderer
///
/// Borrows the document it was rendered from; built once and read-only.
#[derive(Debug, Clone)]
pub struct RenderedView<'a> {
    pub(super) all: Vec<RenderedLine<'a>>,
    pub(super) visible: Vec<RenderedLine<'a>>,
    pub(super) top_level: Vec<RenderedSection<'a>>,
    pub(super) index: BTreeMap<&'a str, RenderedSection<'a>>,
}

impl<'a> RenderedView<'a> {
    /// Lines outside every section (what a fully collapsed consumer shows)
    pub fn lines(&self) -> &[RenderedLine<'a>] {
        &self.visible
    }

    /// Every flattened line, numbered 1..N
    pub fn all_lines(&self) -> &[RenderedLine<'a>] {
        &self.all
    }

    /// Top-level sections in document order
    pub fn sections(&self) -> &[RenderedSection<'a>] {
        &self.top_level
    }

    pub fn section(&self, key: &str) -> Option<&RenderedSection<'a>> {
        self.index.get(key)
    }

    pub fn section_range(&self, key: &str) -> Option<SectionRange> {
        self.index.get(key).map(|s| s.range)
    }

    /// Keys of every non-empty section, sorted
    pub fn section_keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.index.keys().copied()
    }

    /// Content lines of `key` with their original numbers
    ///
    /// # Errors
    ///
    /// Returns `SectionNotFound` for an unknown or empty section.
    pub fn lines_for_section(&self, key: &str) -> Result<&[RenderedLine<'a>]> {
        let section = self
            .index
            .get(key)
            .ok_or_else(|| ApiViewError::SectionNotFound {
                key: key.to_string(),
            })?;
        self.all
            .get(section.range.first - 1..section.range.last)
            .ok_or_else(|| ApiViewError::Internal {
                message: format!("section '{}' range is outside the view", key),
            })
    }

    /// Numbers of the visible lines
    pub fn visible_numbers(&self) -> Vec<usize> {
        self.visible.iter().map(|l| l.number).collect()
    }
}
