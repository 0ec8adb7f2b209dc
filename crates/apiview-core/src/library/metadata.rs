//! JSON library metadata: the compiled-library handle format
//!
//! A metadata file describes one compiled library the way a metadata reader
//! reports it: namespaces → types → members, each optionally carrying an
//! explicit declaration `position`. Entities are deliberately permissive
//! (most fields default) so that a malformed entity survives parsing and is
//! rendered best-effort by the builder; only a document-level problem is a
//! `Compilation` error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::{LibraryHandle, Ordered};
use crate::errors::{ApiViewError, Result};

/// Supported metadata `format_version`
pub const LIBRARY_FORMAT_VERSION: u32 = 1;

/// Entity field that never fails the document
///
/// A null or wrong-typed value falls back to the field's default; the
/// builder then renders the entity best-effort and reports the gap.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Entity list where each malformed element becomes a default entity
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| T::deserialize(item).unwrap_or_default())
        .collect())
}

fn default_language() -> String {
    "C#".to_string()
}

/// Root of a library metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryMetadata {
    pub format_version: u32,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Friend assemblies granted internal access
    #[serde(default)]
    pub internals_visible_to: Vec<String>,
    /// `None` when the library was stripped of its metadata
    #[serde(default)]
    pub namespaces: Option<Vec<NamespaceDef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDef {
    /// Empty for the global namespace
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub diagnostic_only: bool,
    #[serde(default, deserialize_with = "lenient_list")]
    pub types: Vec<TypeDef>,
}

/// Kinds of type declaration the builder knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    Delegate,
}

impl TypeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "class" => Some(TypeKind::Class),
            "struct" => Some(TypeKind::Struct),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            "record" => Some(TypeKind::Record),
            "delegate" => Some(TypeKind::Delegate),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Delegate => "delegate",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub modifiers: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub generic_parameters: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub base_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub docs: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub diagnostic_only: bool,
    #[serde(default, deserialize_with = "lenient_list")]
    pub members: Vec<MemberDef>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub nested_types: Vec<TypeDef>,
    /// Pass-through declaration text; replaces structured rendering
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<String>,
    /// Delegate return type
    #[serde(default, deserialize_with = "lenient")]
    pub return_type: Option<String>,
    /// Delegate parameters
    #[serde(default, deserialize_with = "lenient_list")]
    pub parameters: Vec<ParameterDef>,
}

impl TypeDef {
    pub fn type_kind(&self) -> Option<TypeKind> {
        TypeKind::parse(&self.kind)
    }
}

/// Kinds of member declaration the builder knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Method,
    Property,
    Field,
    Event,
    Constant,
    EnumValue,
}

impl MemberKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "constructor" => Some(MemberKind::Constructor),
            "method" => Some(MemberKind::Method),
            "property" => Some(MemberKind::Property),
            "field" => Some(MemberKind::Field),
            "event" => Some(MemberKind::Event),
            "constant" => Some(MemberKind::Constant),
            "enum_value" => Some(MemberKind::EnumValue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub modifiers: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub generic_parameters: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub return_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub parameters: Vec<ParameterDef>,
    /// Property accessors, e.g. `["get", "set"]`
    #[serde(default, deserialize_with = "lenient")]
    pub accessors: Vec<String>,
    /// Constant or enum value
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub attributes: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub docs: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub diagnostic_only: bool,
}

impl MemberDef {
    pub fn member_kind(&self) -> Option<MemberKind> {
        MemberKind::parse(&self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub type_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub modifiers: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub default: Option<String>,
}

impl Ordered for NamespaceDef {
    fn order_name(&self) -> &str {
        &self.name
    }

    fn declaration_position(&self) -> Option<u32> {
        self.position
    }
}

impl Ordered for TypeDef {
    fn order_name(&self) -> &str {
        &self.name
    }

    fn declaration_position(&self) -> Option<u32> {
        self.position
    }
}

impl Ordered for MemberDef {
    fn order_name(&self) -> &str {
        &self.name
    }

    fn declaration_position(&self) -> Option<u32> {
        self.position
    }
}

impl LibraryMetadata {
    /// Parse a metadata document
    ///
    /// `origin` names the input (usually its path) in error messages.
    ///
    /// # Errors
    ///
    /// Returns `Compilation` if the bytes are not a metadata document or the
    /// format version is unsupported.
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self> {
        let metadata: LibraryMetadata =
            serde_json::from_slice(bytes).map_err(|e| ApiViewError::Compilation {
                library: origin.to_string(),
                reason: format!("not a library metadata document: {}", e),
            })?;

        if metadata.format_version != LIBRARY_FORMAT_VERSION {
            return Err(ApiViewError::Compilation {
                library: metadata.name,
                reason: format!(
                    "unsupported metadata format_version {} (expected {})",
                    metadata.format_version, LIBRARY_FORMAT_VERSION
                ),
            });
        }

        Ok(metadata)
    }
}

impl LibraryHandle for LibraryMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn friend_assemblies(&self) -> &[String] {
        &self.internals_visible_to
    }

    fn namespaces(&self) -> Result<&[NamespaceDef]> {
        self.namespaces
            .as_deref()
            .ok_or_else(|| ApiViewError::Compilation {
                library: self.name.clone(),
                reason: "library carries no metadata".to_string(),
            })
    }
}
