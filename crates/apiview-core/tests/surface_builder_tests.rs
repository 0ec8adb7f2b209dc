#![allow(clippy::unwrap_used, clippy::expect_used)]

// Surface builder scenarios: canonical layout, sections, ids and navigation
mod common;

use apiview_core::errors::ApiViewError;
use apiview_core::library::LibraryMetadata;
use apiview_core::model::{SectionShape, TokenKind};
use apiview_core::{render, SurfaceBuilder};
use common::{library, rendered_text, widgets};

#[test]
fn test_scenario_default_build_golden_layout() {
    // GIVEN the widgets library
    let lib = widgets();

    // WHEN building with defaults
    let file = SurfaceBuilder::new().build(&lib).unwrap();

    // THEN the canonical text matches line for line
    assert_eq!(
        rendered_text(&file),
        [
            "Exposes internals to:",
            "    Contoso.Benchmarks",
            "    Contoso.Widgets.Tests",
            "namespace Contoso.Widgets {",
            "    /// A configurable widget.",
            "    [Serializable]",
            "    public class Widget : IDisposable {",
            "        public Widget(int size);",
            "        public int Size { get; set; }",
            "        public void Attach(Widget.Part part);",
            "        public event EventHandler Changed;",
            "        public void Dispose();",
            "        public struct Part {",
            "            public readonly int Id;",
            "        }",
            "    }",
            "    public enum Color {",
            "        Red = 0,",
            "        Green = 1,",
            "    }",
            "    public static class WidgetFactory {",
            "        public static Widget Create(Color color);",
            "    }",
            "}",
        ]
    );
}

#[test]
fn test_scenario_document_metadata() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();

    assert_eq!(file.language(), "C#");
    assert_eq!(file.package_name(), "Contoso.Widgets");
    assert_eq!(file.package_version(), "2.1.0");
}

#[test]
fn test_scenario_sections_and_visible_lines() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();
    let view = render(&file, false);

    assert_eq!(view.visible_numbers(), [1, 2, 3, 4, 24]);

    let range = |key: &str| {
        let r = view.section_range(key).unwrap();
        (r.first, r.last)
    };
    assert_eq!(range("N:Contoso.Widgets"), (5, 23));
    assert_eq!(range("T:Contoso.Widgets.Widget"), (8, 15));
    assert_eq!(range("T:Contoso.Widgets.Widget.Part"), (14, 14));
    assert_eq!(range("T:Contoso.Widgets.Color"), (18, 19));
    assert_eq!(range("T:Contoso.Widgets.WidgetFactory"), (22, 22));

    let top: Vec<&str> = view.sections().iter().map(|s| s.key).collect();
    assert_eq!(top, ["N:Contoso.Widgets"]);
}

#[test]
fn test_scenario_closing_and_decoration_lines_are_related() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();
    let view = render(&file, false);
    let line = |n: usize| view.all_lines()[n - 1].line;

    // Documentation, attribute and closing brace of Widget
    for n in [5, 6, 16] {
        assert_eq!(line(n).related_line(), Some("T:Contoso.Widgets.Widget"));
        assert_eq!(line(n).line_id(), None);
    }
    assert_eq!(line(24).related_line(), Some("N:Contoso.Widgets"));
    assert_eq!(line(7).line_id(), Some("T:Contoso.Widgets.Widget"));
}

#[test]
fn test_scenario_member_line_ids() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();

    for id in [
        "M:Contoso.Widgets.Widget.#ctor(int)",
        "P:Contoso.Widgets.Widget.Size",
        "M:Contoso.Widgets.Widget.Attach(Widget.Part)",
        "E:Contoso.Widgets.Widget.Changed",
        "M:Contoso.Widgets.Widget.Dispose()",
        "F:Contoso.Widgets.Widget.Part.Id",
        "F:Contoso.Widgets.Color.Red",
        "M:Contoso.Widgets.WidgetFactory.Create(Color)",
    ] {
        assert!(file.find_line(id).is_some(), "missing line id {id}");
    }
}

#[test]
fn test_scenario_type_names_navigate_to_declarations() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();
    let create = file
        .line(
            file.find_line("M:Contoso.Widgets.WidgetFactory.Create(Color)")
                .unwrap(),
        )
        .unwrap();

    let targets: Vec<(&str, Option<&str>)> = create
        .tokens()
        .iter()
        .filter(|t| t.kind() == TokenKind::TypeName)
        .map(|t| (t.value(), t.navigation_target()))
        .collect();
    assert_eq!(
        targets,
        [
            ("Widget", Some("T:Contoso.Widgets.Widget")),
            ("Color", Some("T:Contoso.Widgets.Color")),
        ]
    );
}

#[test]
fn test_scenario_indentation_tokens_are_skip_diff() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();

    for line in file.lines() {
        for token in line.tokens() {
            if token.kind() == TokenKind::Whitespace && token.value().len() >= 4 {
                assert!(token.is_skip_diff(), "indent in {:?}", line.display_text());
            }
        }
    }
}

#[test]
fn test_scenario_no_blank_top_level_lines() {
    let file = SurfaceBuilder::new().build(&widgets()).unwrap();
    for root in file.roots() {
        assert!(!file.line(*root).unwrap().is_blank());
    }
}

#[test]
fn test_scenario_diagnostic_only_included_on_request() {
    let file = SurfaceBuilder::new()
        .include_diagnostic_only(true)
        .build(&widgets())
        .unwrap();
    let text = rendered_text(&file);

    // Detached diagnostics follow Widget's own subtree, before its closing brace
    assert_eq!(text[14], "        }");
    assert_eq!(text[15], "        internal string DumpState();");
    assert_eq!(text[16], "    }");

    let section = file
        .section("T:Contoso.Widgets.Widget:diagnostics")
        .unwrap();
    assert!(section.is_collapsed());
    assert!(matches!(section.shape(), SectionShape::Detached { .. }));

    // Diagnostic-only namespace is included too
    assert!(file.find_line("N:Contoso.Widgets.Diagnostics").is_some());
    assert!(text.contains(&"    public class Tracer { }".to_string()));
}

#[test]
fn test_scenario_diagnostic_section_range_is_separate() {
    let file = SurfaceBuilder::new()
        .include_diagnostic_only(true)
        .build(&widgets())
        .unwrap();
    let view = render(&file, false);

    let nested = view.section_range("T:Contoso.Widgets.Widget").unwrap();
    let detached = view
        .section_range("T:Contoso.Widgets.Widget:diagnostics")
        .unwrap();
    assert_eq!((nested.first, nested.last), (8, 15));
    assert_eq!((detached.first, detached.last), (16, 16));

    let lines = view
        .lines_for_section("T:Contoso.Widgets.Widget:diagnostics")
        .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].number, 16);
}

#[test]
fn test_scenario_no_friend_header_without_friends() {
    let lib = library(
        r#"{"format_version":1,"name":"L","namespaces":[{"name":"N","types":[
            {"name":"A","kind":"class","modifiers":["public"]}]}]}"#,
    );
    let file = SurfaceBuilder::new().build(&lib).unwrap();

    assert_eq!(rendered_text(&file), ["namespace N {", "    public class A { }", "}"]);
}

#[test]
fn test_scenario_malformed_entities_do_not_abort() {
    let lib = library(
        r#"{"format_version":1,"name":"L","namespaces":[{"name":"N","types":[
            {"name":"A","kind":"gadget","members":[
                {"name":"M","kind":"method","parameters":[{"name":"x"}]},
                {"name":"","kind":"field","return_type":"int"}
            ]}]}]}"#,
    );
    let file = SurfaceBuilder::new().build(&lib).unwrap();
    let text = rendered_text(&file);

    assert_eq!(text.len(), 6);
    assert!(text[1].contains("/* unrecognized type kind 'gadget' */"));
    assert!(text[2].contains("? M(? x);"));
    assert!(text[2].contains("missing return type"));
    assert!(text[3].contains("member has no name"));
}

#[test]
fn test_scenario_wrong_typed_member_does_not_abort() {
    // GIVEN a member whose name is null next to a valid member
    let lib = library(
        r#"{"format_version":1,"name":"L","namespaces":[{"name":"N","types":[
            {"name":"A","kind":"class","modifiers":["public"],"members":[
                {"name":null,"kind":"method","return_type":"void"},
                {"name":"Run","kind":"method","modifiers":["public"],"return_type":"void"}
            ]}]}]}"#,
    );

    // WHEN building
    let file = SurfaceBuilder::new().build(&lib).unwrap();
    let text = rendered_text(&file);

    // THEN the broken member is flagged in place and its sibling is intact
    assert_eq!(text.len(), 5);
    assert!(text[2].contains("member has no name"));
    assert_eq!(text[3], "        public void Run();");
}

#[test]
fn test_scenario_empty_namespace_omitted() {
    let lib = library(
        r#"{"format_version":1,"name":"L","namespaces":[{"name":"Empty","types":[]}]}"#,
    );
    let file = SurfaceBuilder::new().build(&lib).unwrap();
    assert!(file.lines().is_empty());
    assert!(render(&file, false).all_lines().is_empty());
}

#[test]
fn test_scenario_unanalyzable_library_is_compilation_error() {
    let err = LibraryMetadata::from_slice(b"\x7fELF not metadata", "libfoo.so").unwrap_err();
    assert!(matches!(err, ApiViewError::Compilation { .. }));

    let stripped = library(r#"{"format_version":1,"name":"Stripped"}"#);
    let err = SurfaceBuilder::new().build(&stripped).unwrap_err();
    assert_eq!(err.kind().code(), "ERR_COMPILATION");
}
