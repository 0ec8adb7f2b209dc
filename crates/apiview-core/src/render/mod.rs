//! Section renderer
//!
//! Flattens a `CodeFile` into numbered display lines and indexes every
//! section by key. Numbering is a pre-order walk of the roots: a line, then
//! its children, then the lines of any detached sections anchored on it.
//! A nested section's range is its heading's subtree (heading excluded); a
//! detached section's range is the run of lines emitted for it.

mod view;

pub use view::{RenderedLine, RenderedSection, RenderedView, SectionRange};

use std::collections::{BTreeMap, HashMap};

use crate::model::{CodeFile, LineIndex, Section, SectionShape};
use crate::{log_op_end, log_op_start};

/// Pending work of the pre-order walk
enum Step<'a> {
    Visit(LineIndex),
    /// Heading's subtree is complete
    CloseNested {
        section: &'a Section,
        heading: usize,
    },
    /// Emit a detached section's lines next
    OpenDetached {
        section: &'a Section,
        heading: usize,
    },
    CloseDetached {
        section: &'a Section,
        heading: usize,
        before: usize,
    },
}

struct Flattener<'a> {
    file: &'a CodeFile,
    nested: HashMap<LineIndex, &'a Section>,
    detached: HashMap<LineIndex, Vec<&'a Section>>,
    lines: Vec<RenderedLine<'a>>,
    recorded: Vec<RenderedSection<'a>>,
}

impl<'a> Flattener<'a> {
    fn new(file: &'a CodeFile) -> Self {
        let mut nested = HashMap::new();
        let mut detached: HashMap<LineIndex, Vec<&'a Section>> = HashMap::new();
        for section in file.sections() {
            match section.shape() {
                SectionShape::Nested { heading } => {
                    nested.insert(*heading, section);
                }
                SectionShape::Detached { anchor, .. } => {
                    detached.entry(*anchor).or_default().push(section);
                }
            }
        }
        Self {
            file,
            nested,
            detached,
            lines: Vec::with_capacity(file.lines().len()),
            recorded: Vec::new(),
        }
    }

    /// Walk with an explicit stack; nesting depth is bounded only by memory
    fn walk(&mut self, roots: &[LineIndex]) {
        let mut stack: Vec<Step<'a>> = roots.iter().rev().map(|r| Step::Visit(*r)).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(index) => self.enter(index, &mut stack),
                Step::CloseNested { section, heading } => self.record(section, heading, heading),
                Step::OpenDetached { section, heading } => {
                    stack.push(Step::CloseDetached {
                        section,
                        heading,
                        before: self.lines.len(),
                    });
                    if let SectionShape::Detached { lines, .. } = section.shape() {
                        stack.extend(lines.iter().rev().map(|l| Step::Visit(*l)));
                    }
                }
                Step::CloseDetached {
                    section,
                    heading,
                    before,
                } => self.record(section, heading, before),
            }
        }
    }

    /// Number `index`, then schedule its children, its nested section and
    /// any detached sections anchored on it, in that order
    fn enter(&mut self, index: LineIndex, stack: &mut Vec<Step<'a>>) {
        let file = self.file;
        let Some(line) = file.line(index) else {
            return;
        };
        self.lines.push(RenderedLine {
            number: self.lines.len() + 1,
            index,
            line,
        });
        let heading = self.lines.len();

        if let Some(anchored) = self.detached.get(&index) {
            stack.extend(
                anchored
                    .iter()
                    .rev()
                    .map(|section| Step::OpenDetached {
                        section: *section,
                        heading,
                    }),
            );
        }
        if let Some(section) = self.nested.get(&index).copied() {
            stack.push(Step::CloseNested { section, heading });
        }
        stack.extend(line.children().iter().rev().map(|c| Step::Visit(*c)));
    }

    /// Record `section` as the lines emitted after position `before`
    fn record(&mut self, section: &'a Section, heading: usize, before: usize) {
        let last = self.lines.len();
        if last == before {
            return;
        }
        self.recorded.push(RenderedSection {
            key: section.key(),
            heading,
            range: SectionRange {
                first: before + 1,
                last,
            },
            collapsed: section.is_collapsed(),
            detached: section.is_detached(),
        });
    }
}

/// Render `file` into a view
///
/// With `diff_only`, visible lines that are unchanged are dropped unless
/// they head a section containing a changed line. Retained lines keep their
/// full-document numbers; section addressing is unaffected.
pub fn render(file: &CodeFile, diff_only: bool) -> RenderedView<'_> {
    log_op_start!("render", diff_only = diff_only);
    let start = std::time::Instant::now();

    let mut flattener = Flattener::new(file);
    flattener.walk(file.roots());
    let Flattener {
        lines: all,
        mut recorded,
        ..
    } = flattener;

    let mut inside = vec![false; all.len() + 1];
    for section in &recorded {
        for slot in &mut inside[section.range.first..=section.range.last] {
            *slot = true;
        }
    }

    // changed[n] = number of changed lines among 1..=n
    let mut changed = vec![0usize; all.len() + 1];
    for (i, line) in all.iter().enumerate() {
        changed[i + 1] = changed[i] + usize::from(!line.line.diff_kind().is_unchanged());
    }
    let has_change = |range: SectionRange| changed[range.last] > changed[range.first - 1];

    let mut headed: HashMap<usize, Vec<SectionRange>> = HashMap::new();
    for section in &recorded {
        headed.entry(section.heading).or_default().push(section.range);
    }

    let visible: Vec<RenderedLine<'_>> = all
        .iter()
        .filter(|l| !inside[l.number])
        .filter(|l| {
            !diff_only
                || !l.line.diff_kind().is_unchanged()
                || headed
                    .get(&l.number)
                    .is_some_and(|ranges| ranges.iter().any(|r| has_change(*r)))
        })
        .copied()
        .collect();

    recorded.sort_by(|a, b| {
        a.range
            .first
            .cmp(&b.range.first)
            .then(b.range.last.cmp(&a.range.last))
    });
    let mut top_level = Vec::new();
    let mut covered = 0;
    for section in &recorded {
        if section.range.first > covered {
            top_level.push(*section);
            covered = section.range.last;
        }
    }

    let index: BTreeMap<&str, RenderedSection<'_>> =
        recorded.iter().map(|s| (s.key, *s)).collect();

    log_op_end!(
        "render",
        duration_ms = start.elapsed().as_millis() as u64,
        line_count = all.len(),
        section_count = index.len(),
        visible_count = visible.len()
    );

    RenderedView {
        all,
        visible,
        top_level,
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiViewError;
    use crate::model::{CodeFileBuilder, CodeLine, DiffKind, Token};

    fn line(text: &str) -> CodeLine {
        CodeLine::new(vec![Token::text(text)])
    }

    /// ns { a { a1 } b } with a detached section on `a`
    fn sample() -> CodeFile {
        let mut b = CodeFileBuilder::new("C#");
        let ns = b.add_root(line("namespace N {").with_id("N:N"));
        let a = b.add_child(ns, line("class A {").with_id("T:N.A")).unwrap();
        b.add_child(a, line("void A1();")).unwrap();
        b.add_child(ns, line("}")).unwrap();
        let diag = b.add_detached_line(line("void Trace();"));
        b.detach_section("T:N.A:diagnostics", a, vec![diag], true);
        b.nest_section("T:N.A", a, false);
        b.nest_section("N:N", ns, false);
        b.add_root(line("}"));
        b.finish().unwrap()
    }

    #[test]
    fn test_preorder_numbering_with_detached_after_subtree() {
        let file = sample();
        let view = render(&file, false);
        let texts: Vec<String> = view.all_lines().iter().map(RenderedLine::text).collect();

        assert_eq!(
            texts,
            ["namespace N {", "class A {", "void A1();", "void Trace();", "}", "}"]
        );
        assert_eq!(
            view.section_range("T:N.A"),
            Some(SectionRange { first: 3, last: 3 })
        );
        assert_eq!(
            view.section_range("T:N.A:diagnostics"),
            Some(SectionRange { first: 4, last: 4 })
        );
        assert_eq!(
            view.section_range("N:N"),
            Some(SectionRange { first: 2, last: 5 })
        );
    }

    #[test]
    fn test_visible_lines_and_top_level_sections() {
        let file = sample();
        let view = render(&file, false);

        assert_eq!(view.visible_numbers(), [1, 6]);
        let keys: Vec<&str> = view.sections().iter().map(|s| s.key).collect();
        assert_eq!(keys, ["N:N"]);
    }

    #[test]
    fn test_lines_for_section_unknown_key() {
        let file = sample();
        let view = render(&file, false);

        let err = view.lines_for_section("T:N.Missing").unwrap_err();
        assert!(matches!(err, ApiViewError::SectionNotFound { key } if key == "T:N.Missing"));
    }

    #[test]
    fn test_empty_section_is_not_indexed() {
        let mut b = CodeFileBuilder::new("C#");
        let a = b.add_root(line("class A { }").with_id("T:A"));
        b.nest_section("T:A", a, false);
        let file = b.finish().unwrap();

        let view = render(&file, false);
        assert!(view.section_range("T:A").is_none());
        assert!(view.lines_for_section("T:A").is_err());
        assert_eq!(view.visible_numbers(), [1]);
    }

    #[test]
    fn test_diff_only_keeps_headings_of_changed_sections() {
        let file = sample();
        let a1 = LineIndex::from_usize(2);
        let changed = file
            .with_diff_annotations([(a1, DiffKind::Modified)])
            .unwrap();

        let view = render(&changed, true);
        assert_eq!(view.visible_numbers(), [1]);
        assert_eq!(
            view.section_range("N:N"),
            Some(SectionRange { first: 2, last: 5 })
        );
    }

    #[test]
    fn test_diff_only_without_changes_hides_everything() {
        let file = sample();
        let view = render(&file, true);
        assert!(view.lines().is_empty());
        assert_eq!(view.all_lines().len(), 6);
    }
}
