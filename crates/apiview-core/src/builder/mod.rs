//! Surface builder: compiled library → canonical `CodeFile`
//!
//! The builder walks namespaces, types and members in the order chosen by
//! an `OrderingProvider` and emits one line per declaration (plus attribute,
//! documentation and closing-brace lines). Namespaces and types with bodies
//! head nested sections keyed by their line id. Diagnostic-only members, when
//! requested, go into a collapsed detached section anchored on their type.
//!
//! Malformed entities never abort a build: they are rendered best-effort
//! with an explanatory comment token and reported with `warn!`.

pub mod formatting;
pub mod signature;

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use self::signature::{
    attribute_tokens, member_declaration, member_id, namespace_id, qualify, type_declaration,
    type_id, Problems, TypeBody, TypeIndex,
};
use crate::errors::Result;
use crate::library::{LibraryHandle, MemberDef, NamespaceDef, TypeDef, TypeKind};
use crate::model::{CodeFile, CodeFileBuilder, CodeLine, LineIndex, Token};
use crate::ordering::{DeclarationOrder, OrderingProvider};
use crate::{log_op_end, log_op_error, log_op_start};

/// Line id of the friend-assembly header
pub const FRIEND_HEADER_ID: &str = "InternalsVisibleTo";

/// Suffix of the detached section holding a type's diagnostic-only members
pub const DIAGNOSTICS_SUFFIX: &str = ":diagnostics";

/// Builds canonical documents from library handles
///
/// Holds no per-build state, so one builder can serve concurrent builds.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuilder<P = DeclarationOrder> {
    ordering: P,
    include_diagnostic_only: bool,
}

impl SurfaceBuilder<DeclarationOrder> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: OrderingProvider> SurfaceBuilder<P> {
    pub fn with_ordering(ordering: P) -> Self {
        Self {
            ordering,
            include_diagnostic_only: false,
        }
    }

    /// Include entities flagged as diagnostic-only
    pub fn include_diagnostic_only(mut self, include: bool) -> Self {
        self.include_diagnostic_only = include;
        self
    }

    /// Build the canonical document for `library`
    ///
    /// # Errors
    ///
    /// Returns `Compilation` if the library cannot be analyzed, or
    /// `InvalidDocument` if the emitted arena fails validation.
    pub fn build<L: LibraryHandle + ?Sized>(&self, library: &L) -> Result<CodeFile> {
        log_op_start!("build_surface", library = library.name());
        let start = std::time::Instant::now();

        let file = self.build_impl(library).map_err(|e| {
            log_op_error!(
                "build_surface",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                library = library.name()
            );
            e
        })?;

        log_op_end!(
            "build_surface",
            duration_ms = start.elapsed().as_millis() as u64,
            library = library.name(),
            line_count = file.lines().len(),
            section_count = file.sections().len()
        );

        Ok(file)
    }

    fn build_impl<L: LibraryHandle + ?Sized>(&self, library: &L) -> Result<CodeFile> {
        let namespaces = library.namespaces()?;

        let mut emitter = Emitter {
            ordering: &self.ordering,
            include_diagnostic_only: self.include_diagnostic_only,
            index: TypeIndex::new(namespaces),
            out: CodeFileBuilder::new(library.language())
                .package(library.name(), library.version()),
            used_ids: HashSet::new(),
            library: library.name(),
        };

        emitter.emit_friend_header(library.friend_assemblies())?;
        for ns in self.ordering.order_namespaces(namespaces) {
            if ns.diagnostic_only && !self.include_diagnostic_only {
                continue;
            }
            emitter.emit_namespace(ns)?;
        }

        emitter.out.finish()
    }
}

/// Build with an explicit ordering provider
///
/// # Errors
///
/// See [`SurfaceBuilder::build`].
pub fn build_surface<L, P>(library: &L, include_diagnostic_only: bool, ordering: P) -> Result<CodeFile>
where
    L: LibraryHandle + ?Sized,
    P: OrderingProvider,
{
    SurfaceBuilder::with_ordering(ordering)
        .include_diagnostic_only(include_diagnostic_only)
        .build(library)
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Root,
    Under(LineIndex),
    /// Claimed by a detached section afterwards
    Detached,
}

fn indented(depth: usize, tokens: Vec<Token>) -> Vec<Token> {
    if depth == 0 {
        return tokens;
    }
    let mut line = Vec::with_capacity(tokens.len() + 1);
    line.push(Token::indent(depth));
    line.extend(tokens);
    line
}

/// Per-build emission state
struct Emitter<'a, P> {
    ordering: &'a P,
    include_diagnostic_only: bool,
    index: TypeIndex,
    out: CodeFileBuilder,
    used_ids: HashSet<String>,
    library: &'a str,
}

impl<P: OrderingProvider> Emitter<'_, P> {
    fn place(&mut self, target: Target, line: CodeLine) -> Result<Option<LineIndex>> {
        match target {
            // Top-level output never carries blank lines
            Target::Root if line.is_blank() => Ok(None),
            Target::Root => Ok(Some(self.out.add_root(line))),
            Target::Under(parent) => self.out.add_child(parent, line).map(Some),
            Target::Detached => Ok(Some(self.out.add_detached_line(line))),
        }
    }

    /// Claim `id`, suffixing `~2`, `~3`, ... when it is already taken
    fn unique_id(&mut self, id: String) -> String {
        if self.used_ids.insert(id.clone()) {
            return id;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}~{}", id, n);
            if self.used_ids.insert(candidate.clone()) {
                warn!(
                    op = "build_surface",
                    library = self.library,
                    line_id = %id,
                    assigned = %candidate,
                    "duplicate declaration id"
                );
                return candidate;
            }
            n += 1;
        }
    }

    fn report(&self, id: &str, problems: &Problems) {
        if problems.is_empty() {
            return;
        }
        warn!(
            op = "build_surface",
            library = self.library,
            line_id = id,
            problems = %problems.join("; "),
            "malformed entity rendered best-effort"
        );
    }

    fn emit_friend_header(&mut self, friends: &[String]) -> Result<()> {
        let friends: BTreeSet<&str> = friends
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        if friends.is_empty() {
            return Ok(());
        }

        let header_id = self.unique_id(FRIEND_HEADER_ID.to_string());
        let header = CodeLine::new(vec![Token::text("Exposes internals to:")]).with_id(&header_id);
        self.place(Target::Root, header)?;

        for friend in friends {
            let id = self.unique_id(format!("{}:{}", FRIEND_HEADER_ID, friend));
            let line = CodeLine::new(vec![Token::indent(1), Token::text(friend)])
                .with_id(id)
                .related_to(&header_id);
            self.place(Target::Root, line)?;
        }
        Ok(())
    }

    fn visible_types<'t>(&self, types: &'t [TypeDef]) -> Vec<&'t TypeDef> {
        let include = self.include_diagnostic_only;
        self.ordering
            .order_types(types)
            .into_iter()
            .filter(|t| include || !t.diagnostic_only)
            .collect()
    }

    fn emit_namespace(&mut self, ns: &NamespaceDef) -> Result<()> {
        let types = self.visible_types(&ns.types);
        if types.is_empty() {
            return Ok(());
        }

        // Global namespace: types are top-level
        if ns.name.is_empty() {
            for ty in types {
                self.emit_type(Target::Root, 0, "", ty)?;
            }
            return Ok(());
        }

        let id = self.unique_id(namespace_id(&ns.name));
        let heading = CodeLine::new(vec![
            Token::keyword("namespace"),
            Token::space(),
            Token::type_name(ns.name.as_str()),
            Token::space(),
            Token::punctuation("{"),
        ])
        .with_id(&id);
        let Some(heading) = self.place(Target::Root, heading)? else {
            return Ok(());
        };

        for ty in types {
            self.emit_type(Target::Under(heading), 1, &ns.name, ty)?;
        }
        self.out.nest_section(&id, heading, false);

        let closing = CodeLine::new(vec![Token::punctuation("}")]).related_to(&id);
        self.place(Target::Root, closing)?;
        Ok(())
    }

    /// Documentation and attribute lines preceding a declaration
    fn emit_preamble(
        &mut self,
        target: Target,
        depth: usize,
        id: &str,
        docs: Option<&str>,
        attributes: &[String],
    ) -> Result<Vec<LineIndex>> {
        let mut placed = Vec::new();
        for doc in docs.into_iter().flat_map(str::lines) {
            let text = format!("/// {}", doc.trim());
            let line = CodeLine::new(indented(depth, vec![Token::comment(text.trim_end())]))
                .related_to(id);
            placed.extend(self.place(target, line)?);
        }
        for attribute in attributes {
            let line = CodeLine::new(indented(depth, attribute_tokens(attribute))).related_to(id);
            placed.extend(self.place(target, line)?);
        }
        Ok(placed)
    }

    fn emit_type(&mut self, target: Target, depth: usize, container: &str, ty: &TypeDef) -> Result<()> {
        let name = if ty.name.is_empty() { "?" } else { ty.name.as_str() };
        let full_name = qualify(container, name);
        let id = self.unique_id(type_id(&full_name));

        self.emit_preamble(target, depth, &id, ty.docs.as_deref(), &ty.attributes)?;

        if let Some(source) = &ty.source {
            return self.emit_pass_through(target, depth, &id, source);
        }

        let include = self.include_diagnostic_only;
        let (regular, diagnostics): (Vec<&MemberDef>, Vec<&MemberDef>) = self
            .ordering
            .order_members(&ty.members)
            .into_iter()
            .filter(|m| include || !m.diagnostic_only)
            .partition(|m| !m.diagnostic_only);
        let nested = self.visible_types(&ty.nested_types);

        let has_body = ty.type_kind() != Some(TypeKind::Delegate)
            && !(regular.is_empty() && nested.is_empty() && diagnostics.is_empty());
        let body = if has_body {
            TypeBody::Open
        } else {
            TypeBody::Empty
        };

        let mut problems = Problems::new();
        let tokens = type_declaration(ty, &self.index, body, &mut problems);
        self.report(&id, &problems);

        let line = CodeLine::new(indented(depth, tokens)).with_id(&id);
        let Some(heading) = self.place(target, line)? else {
            return Ok(());
        };
        if !has_body {
            return Ok(());
        }

        for member in regular {
            self.emit_member(Target::Under(heading), depth + 1, &full_name, name, member)?;
        }
        for nested_type in nested {
            self.emit_type(Target::Under(heading), depth + 1, &full_name, nested_type)?;
        }
        let has_children = self
            .out
            .line(heading)
            .is_some_and(|l| !l.children().is_empty());
        if has_children {
            self.out.nest_section(&id, heading, false);
        }

        if !diagnostics.is_empty() {
            let mut lines = Vec::new();
            for member in diagnostics {
                lines.extend(self.emit_member(Target::Detached, depth + 1, &full_name, name, member)?);
            }
            self.out
                .detach_section(format!("{}{}", id, DIAGNOSTICS_SUFFIX), heading, lines, true);
        }

        let closing = CodeLine::new(indented(depth, vec![Token::punctuation("}")])).related_to(&id);
        self.place(target, closing)?;
        Ok(())
    }

    fn emit_member(
        &mut self,
        target: Target,
        depth: usize,
        type_full_name: &str,
        type_name: &str,
        member: &MemberDef,
    ) -> Result<Vec<LineIndex>> {
        let id = self.unique_id(member_id(type_full_name, member));
        let mut placed =
            self.emit_preamble(target, depth, &id, member.docs.as_deref(), &member.attributes)?;

        let mut problems = Problems::new();
        let tokens = member_declaration(member, type_name, &self.index, &mut problems);
        self.report(&id, &problems);

        let line = CodeLine::new(indented(depth, tokens)).with_id(id);
        placed.extend(self.place(target, line)?);
        Ok(placed)
    }

    /// Declaration text carried verbatim, after marker processing
    fn emit_pass_through(&mut self, target: Target, depth: usize, id: &str, source: &str) -> Result<()> {
        let lines = formatting::apply_markers(source);
        if lines.is_empty() {
            self.report(id, &vec!["declaration text is empty".to_string()]);
            let line = CodeLine::new(indented(depth, vec![Token::comment("/* empty declaration */")]))
                .with_id(id);
            self.place(target, line)?;
            return Ok(());
        }

        for (i, segments) in lines.iter().enumerate() {
            let line = CodeLine::new(indented(depth, formatting::line_tokens(segments)));
            let line = if i == 0 {
                line.with_id(id)
            } else {
                line.related_to(id)
            };
            self.place(target, line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibraryMetadata;
    use crate::model::SectionShape;
    use crate::ordering::NameOrder;

    fn library(json: &str) -> LibraryMetadata {
        LibraryMetadata::from_slice(json.as_bytes(), "test").unwrap()
    }

    fn texts(file: &CodeFile, indices: &[LineIndex]) -> Vec<String> {
        indices
            .iter()
            .map(|i| file.line(*i).unwrap().display_text())
            .collect()
    }

    const WIDGETS: &str = r#"{
        "format_version": 1,
        "name": "Contoso.Widgets",
        "version": "1.2.0",
        "internals_visible_to": ["Contoso.Tests", "Contoso.Benchmarks", "Contoso.Tests"],
        "namespaces": [{
            "name": "Contoso.Widgets",
            "types": [{
                "name": "Widget",
                "kind": "class",
                "modifiers": ["public"],
                "docs": "A widget.",
                "members": [
                    {"name": "Widget", "kind": "constructor", "modifiers": ["public"]},
                    {"name": "Run", "kind": "method", "modifiers": ["public"], "return_type": "void"},
                    {"name": "Trace", "kind": "method", "modifiers": ["internal"],
                     "return_type": "void", "diagnostic_only": true}
                ]
            }, {
                "name": "Empty",
                "kind": "struct",
                "modifiers": ["public"]
            }]
        }]
    }"#;

    #[test]
    fn test_friend_header_is_first_and_sorted() {
        let file = SurfaceBuilder::new().build(&library(WIDGETS)).unwrap();
        let top = texts(&file, &file.roots()[..3]);

        assert_eq!(
            top,
            [
                "Exposes internals to:",
                "    Contoso.Benchmarks",
                "    Contoso.Tests"
            ]
        );
    }

    #[test]
    fn test_namespace_heads_nested_section() {
        let file = SurfaceBuilder::new().build(&library(WIDGETS)).unwrap();
        let section = file.section("N:Contoso.Widgets").unwrap();

        let heading = file.find_line("N:Contoso.Widgets").unwrap();
        assert_eq!(section.shape(), &SectionShape::Nested { heading });
        assert_eq!(
            texts(&file, file.line(heading).unwrap().children()),
            [
                "    /// A widget.",
                "    public class Widget {",
                "    }",
                "    public struct Empty { }"
            ]
        );
        assert_eq!(
            file.line(*file.roots().last().unwrap()).unwrap().display_text(),
            "}"
        );
    }

    #[test]
    fn test_diagnostic_members_omitted_by_default() {
        let file = SurfaceBuilder::new().build(&library(WIDGETS)).unwrap();
        assert!(file.find_line("M:Contoso.Widgets.Widget.Trace()").is_none());
        assert!(file.section("T:Contoso.Widgets.Widget:diagnostics").is_none());
    }

    #[test]
    fn test_diagnostic_members_go_to_detached_section() {
        let file = SurfaceBuilder::new()
            .include_diagnostic_only(true)
            .build(&library(WIDGETS))
            .unwrap();

        let section = file.section("T:Contoso.Widgets.Widget:diagnostics").unwrap();
        assert!(section.is_collapsed());
        let SectionShape::Detached { anchor, lines } = section.shape() else {
            panic!("expected detached section");
        };
        assert_eq!(Some(*anchor), file.find_line("T:Contoso.Widgets.Widget"));
        assert_eq!(texts(&file, lines), ["        internal void Trace();"]);
    }

    #[test]
    fn test_members_carry_ids_and_navigation() {
        let file = SurfaceBuilder::new().build(&library(WIDGETS)).unwrap();
        let ctor = file.find_line("M:Contoso.Widgets.Widget.#ctor()").unwrap();
        assert_eq!(
            file.line(ctor).unwrap().display_text(),
            "        public Widget();"
        );
    }

    #[test]
    fn test_name_order_sorts_types() {
        let file = SurfaceBuilder::with_ordering(NameOrder)
            .build(&library(WIDGETS))
            .unwrap();
        let ns = file.find_line("N:Contoso.Widgets").unwrap();
        let first_child = file.line(ns).unwrap().children()[0];
        assert_eq!(
            file.line(first_child).unwrap().display_text(),
            "    public struct Empty { }"
        );
    }

    #[test]
    fn test_library_without_metadata_fails() {
        let lib = library(r#"{"format_version":1,"name":"Stripped"}"#);
        let err = SurfaceBuilder::new().build(&lib).unwrap_err();
        assert!(matches!(err, crate::errors::ApiViewError::Compilation { .. }));
    }

    #[test]
    fn test_duplicate_overloads_get_unique_ids() {
        let lib = library(
            r#"{"format_version":1,"name":"L","namespaces":[{"name":"N","types":[
                {"name":"T","kind":"class","members":[
                    {"name":"M","kind":"method","return_type":"void","parameters":[{"name":"a","type":"int"}]},
                    {"name":"M","kind":"method","return_type":"void","parameters":[{"name":"b","type":"int"}]}
                ]}]}]}"#,
        );
        let file = SurfaceBuilder::new().build(&lib).unwrap();
        assert!(file.find_line("M:N.T.M(int)").is_some());
        assert!(file.find_line("M:N.T.M(int)~2").is_some());
    }

    #[test]
    fn test_pass_through_source_is_formatted() {
        let lib = library(
            r#"{"format_version":1,"name":"L","namespaces":[{"name":"N","types":[
                {"name":"Legacy","kind":"class",
                 "source":"public class Legacy\n{\n/*-*/    void Hidden();\n/*-*/    public void Run();   \n\n}"}
            ]}]}"#,
        );
        let file = SurfaceBuilder::new().build(&lib).unwrap();
        let ns = file.find_line("N:N").unwrap();

        assert_eq!(
            texts(&file, file.line(ns).unwrap().children()),
            [
                "    public class Legacy",
                "    {",
                "        public void Run();",
                "    }"
            ]
        );
        assert_eq!(
            file.find_line("T:N.Legacy"),
            Some(file.line(ns).unwrap().children()[0])
        );
    }

    #[test]
    fn test_global_namespace_types_are_top_level() {
        let lib = library(
            r#"{"format_version":1,"name":"L","namespaces":[{"name":"","types":[
                {"name":"Loose","kind":"class","modifiers":["public"]}]}]}"#,
        );
        let file = SurfaceBuilder::new().build(&lib).unwrap();
        assert_eq!(texts(&file, file.roots()), ["public class Loose { }"]);
    }
}
