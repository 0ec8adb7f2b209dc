use apiview_core::library::LibraryMetadata;
use apiview_core::CodeFile;

/// A library exercising every feature the builder supports
#[allow(dead_code)]
pub const WIDGETS_JSON: &str = r#"{
    "format_version": 1,
    "name": "Contoso.Widgets",
    "version": "2.1.0",
    "language": "C#",
    "internals_visible_to": ["Contoso.Widgets.Tests", "Contoso.Benchmarks"],
    "namespaces": [
        {
            "name": "Contoso.Widgets",
            "position": 0,
            "types": [
                {
                    "name": "Widget",
                    "kind": "class",
                    "position": 0,
                    "modifiers": ["public"],
                    "base_types": ["IDisposable"],
                    "attributes": ["[Serializable]"],
                    "docs": "A configurable widget.",
                    "members": [
                        {"name": "Widget", "kind": "constructor", "position": 0, "modifiers": ["public"],
                         "parameters": [{"name": "size", "type": "int"}]},
                        {"name": "Size", "kind": "property", "position": 1, "modifiers": ["public"],
                         "return_type": "int", "accessors": ["get", "set"]},
                        {"name": "Attach", "kind": "method", "position": 2, "modifiers": ["public"],
                         "return_type": "void", "parameters": [{"name": "part", "type": "Widget.Part"}]},
                        {"name": "Changed", "kind": "event", "position": 3, "modifiers": ["public"],
                         "return_type": "EventHandler"},
                        {"name": "DumpState", "kind": "method", "position": 4, "modifiers": ["internal"],
                         "return_type": "string", "diagnostic_only": true},
                        {"name": "Dispose", "kind": "method", "position": 5, "modifiers": ["public"],
                         "return_type": "void"}
                    ],
                    "nested_types": [
                        {"name": "Part", "kind": "struct", "modifiers": ["public"],
                         "members": [{"name": "Id", "kind": "field", "modifiers": ["public", "readonly"],
                                      "return_type": "int"}]}
                    ]
                },
                {
                    "name": "Color",
                    "kind": "enum",
                    "position": 1,
                    "modifiers": ["public"],
                    "members": [
                        {"name": "Red", "kind": "enum_value", "value": "0"},
                        {"name": "Green", "kind": "enum_value", "value": "1"}
                    ]
                },
                {
                    "name": "WidgetFactory",
                    "kind": "class",
                    "position": 2,
                    "modifiers": ["public", "static"],
                    "members": [
                        {"name": "Create", "kind": "method", "modifiers": ["public", "static"],
                         "return_type": "Widget", "parameters": [{"name": "color", "type": "Color"}]}
                    ]
                }
            ]
        },
        {
            "name": "Contoso.Widgets.Diagnostics",
            "position": 1,
            "diagnostic_only": true,
            "types": [
                {"name": "Tracer", "kind": "class", "modifiers": ["public"]}
            ]
        }
    ]
}"#;

#[allow(dead_code)]
pub fn library(json: &str) -> LibraryMetadata {
    LibraryMetadata::from_slice(json.as_bytes(), "fixture").expect("fixture must parse")
}

#[allow(dead_code)]
pub fn widgets() -> LibraryMetadata {
    library(WIDGETS_JSON)
}

/// Display text of every line in render order
#[allow(dead_code)]
pub fn rendered_text(file: &CodeFile) -> Vec<String> {
    apiview_core::render(file, false)
        .all_lines()
        .iter()
        .map(|l| l.text())
        .collect()
}
