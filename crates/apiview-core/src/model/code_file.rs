use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::line::{CodeLine, DiffKind, LineIndex};
use super::section::{Section, SectionShape};
use crate::errors::{ApiViewError, Result};

/// Current persisted document schema version
pub const DOCUMENT_SCHEMA_VERSION: u32 = 1;

/// Canonical document: the ordered, tokenized public surface of one library
///
/// Lines live in an arena addressed by `LineIndex`. A `CodeFile` can only be
/// obtained through `CodeFileBuilder::finish` or deserialization, both of
/// which validate the structural invariants, and it is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CodeFileRepr")]
pub struct CodeFile {
    document_schema_version: u32,
    language: String,
    package_name: String,
    package_version: String,
    lines: Vec<CodeLine>,
    roots: Vec<LineIndex>,
    sections: Vec<Section>,
}

/// Unvalidated wire shape of a `CodeFile`
#[derive(Deserialize)]
struct CodeFileRepr {
    document_schema_version: u32,
    language: String,
    package_name: String,
    package_version: String,
    lines: Vec<CodeLine>,
    roots: Vec<LineIndex>,
    sections: Vec<Section>,
}

impl TryFrom<CodeFileRepr> for CodeFile {
    type Error = ApiViewError;

    fn try_from(repr: CodeFileRepr) -> Result<Self> {
        if repr.document_schema_version != DOCUMENT_SCHEMA_VERSION {
            return Err(ApiViewError::InvalidDocument {
                reason: format!(
                    "unsupported document_schema_version {} (expected {})",
                    repr.document_schema_version, DOCUMENT_SCHEMA_VERSION
                ),
            });
        }

        let file = CodeFile {
            document_schema_version: repr.document_schema_version,
            language: repr.language,
            package_name: repr.package_name,
            package_version: repr.package_version,
            lines: repr.lines,
            roots: repr.roots,
            sections: repr.sections,
        };
        file.validate()?;
        Ok(file)
    }
}

fn invalid(reason: String) -> ApiViewError {
    ApiViewError::InvalidDocument { reason }
}

impl CodeFile {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_version(&self) -> &str {
        &self.package_version
    }

    pub fn lines(&self) -> &[CodeLine] {
        &self.lines
    }

    pub fn line(&self, index: LineIndex) -> Option<&CodeLine> {
        self.lines.get(index.index())
    }

    /// Top-level lines in document order
    pub fn roots(&self) -> &[LineIndex] {
        &self.roots
    }

    /// All sections, nested and detached, in creation order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key() == key)
    }

    /// Arena index of the line carrying `line_id`
    pub fn find_line(&self, line_id: &str) -> Option<LineIndex> {
        self.lines
            .iter()
            .position(|l| l.line_id() == Some(line_id))
            .map(LineIndex::from_usize)
    }

    /// Return a copy carrying the diff collaborator's change annotations
    ///
    /// The receiver is consumed; a document is never mutated in place.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if an index is outside the arena.
    pub fn with_diff_annotations<I>(mut self, annotations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (LineIndex, DiffKind)>,
    {
        for (index, kind) in annotations {
            let line = self
                .lines
                .get_mut(index.index())
                .ok_or_else(|| invalid(format!("diff annotation for unknown line {}", index)))?;
            line.set_diff_kind(kind);
        }
        Ok(self)
    }

    /// Check every structural invariant of the arena
    fn validate(&self) -> Result<()> {
        let n = self.lines.len();
        let mut refs = vec![0usize; n];
        let mut count = |index: LineIndex, owner: &str| -> Result<()> {
            let slot = refs
                .get_mut(index.index())
                .ok_or_else(|| invalid(format!("{} references unknown line {}", owner, index)))?;
            *slot += 1;
            Ok(())
        };

        for root in &self.roots {
            count(*root, "roots")?;
        }
        for (i, line) in self.lines.iter().enumerate() {
            for child in line.children() {
                count(*child, &format!("line #{}", i))?;
            }
        }
        for section in &self.sections {
            if let SectionShape::Detached { lines, .. } = section.shape() {
                for index in lines {
                    count(*index, &format!("section '{}'", section.key()))?;
                }
            }
        }
        if let Some((i, times)) = refs.iter().enumerate().find(|(_, c)| **c != 1) {
            return Err(invalid(format!(
                "line #{} is referenced {} times (expected exactly once)",
                i, times
            )));
        }

        // Every line is referenced once; anything unreachable from a root or
        // a detached section start is part of a cycle.
        let structural = self.reach(self.roots.iter().copied());
        let detached_starts = self.sections.iter().flat_map(|s| match s.shape() {
            SectionShape::Detached { lines, .. } => lines.clone(),
            SectionShape::Nested { .. } => Vec::new(),
        });
        let detached = self.reach(detached_starts);
        if structural.len() + detached.len() != n {
            return Err(invalid("line children form a cycle".to_string()));
        }

        let mut keys = HashSet::new();
        let mut headings = HashSet::new();
        for section in &self.sections {
            if section.key().is_empty() {
                return Err(invalid("section with empty key".to_string()));
            }
            if !keys.insert(section.key()) {
                return Err(invalid(format!("duplicate section key '{}'", section.key())));
            }
            match section.shape() {
                SectionShape::Nested { heading } => {
                    if heading.index() >= n {
                        return Err(invalid(format!(
                            "section '{}' heading {} is outside the document",
                            section.key(),
                            heading
                        )));
                    }
                    if !headings.insert(*heading) {
                        return Err(invalid(format!(
                            "line {} heads more than one nested section",
                            heading
                        )));
                    }
                }
                SectionShape::Detached { anchor, .. } => {
                    if !structural.contains(anchor) {
                        return Err(invalid(format!(
                            "detached section '{}' anchor {} is not a structural line",
                            section.key(),
                            anchor
                        )));
                    }
                }
            }
        }

        let mut ids = HashSet::new();
        for line in &self.lines {
            if let Some(id) = line.line_id() {
                if !ids.insert(id) {
                    return Err(invalid(format!("duplicate line id '{}'", id)));
                }
            }
        }

        Ok(())
    }

    /// Lines reachable through children from `starts`
    fn reach(&self, starts: impl IntoIterator<Item = LineIndex>) -> HashSet<LineIndex> {
        let mut seen = HashSet::new();
        let mut stack: Vec<LineIndex> = starts.into_iter().collect();
        while let Some(index) = stack.pop() {
            if !seen.insert(index) {
                continue;
            }
            if let Some(line) = self.line(index) {
                stack.extend(line.children().iter().copied());
            }
        }
        seen
    }
}

/// Incremental construction of a `CodeFile` arena
#[derive(Debug, Clone)]
pub struct CodeFileBuilder {
    language: String,
    package_name: String,
    package_version: String,
    lines: Vec<CodeLine>,
    roots: Vec<LineIndex>,
    sections: Vec<Section>,
}

impl CodeFileBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            package_name: String::new(),
            package_version: String::new(),
            lines: Vec::new(),
            roots: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn package(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.package_name = name.into();
        self.package_version = version.into();
        self
    }

    /// Append a top-level line
    pub fn add_root(&mut self, line: CodeLine) -> LineIndex {
        let index = self.push(line);
        self.roots.push(index);
        index
    }

    /// Append a child line under `parent`
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if `parent` was not created by this builder.
    pub fn add_child(&mut self, parent: LineIndex, line: CodeLine) -> Result<LineIndex> {
        if parent.index() >= self.lines.len() {
            return Err(invalid(format!("parent {} does not exist", parent)));
        }
        let index = self.push(line);
        self.lines[parent.index()].push_child(index);
        Ok(index)
    }

    /// Add a line that is not part of the structural tree
    ///
    /// The line must be claimed by a detached section (or be the child of
    /// one that is) before `finish`.
    pub fn add_detached_line(&mut self, line: CodeLine) -> LineIndex {
        self.push(line)
    }

    /// Declare a nested section headed by `heading`
    pub fn nest_section(&mut self, key: impl Into<String>, heading: LineIndex, collapsed: bool) {
        self.sections.push(Section::nested(key, heading, collapsed));
    }

    /// Declare a detached leaf section anchored on `anchor`
    pub fn detach_section(
        &mut self,
        key: impl Into<String>,
        anchor: LineIndex,
        lines: Vec<LineIndex>,
        collapsed: bool,
    ) {
        self.sections
            .push(Section::detached(key, anchor, lines, collapsed));
    }

    pub fn line(&self, index: LineIndex) -> Option<&CodeLine> {
        self.lines.get(index.index())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Validate and freeze the document
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if any structural invariant is violated.
    pub fn finish(self) -> Result<CodeFile> {
        let file = CodeFile {
            document_schema_version: DOCUMENT_SCHEMA_VERSION,
            language: self.language,
            package_name: self.package_name,
            package_version: self.package_version,
            lines: self.lines,
            roots: self.roots,
            sections: self.sections,
        };
        file.validate()?;
        Ok(file)
    }

    fn push(&mut self, line: CodeLine) -> LineIndex {
        self.lines.push(line);
        LineIndex::from_usize(self.lines.len() - 1)
    }
}
