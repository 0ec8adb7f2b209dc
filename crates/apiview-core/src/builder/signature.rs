//! Declaration tokens and line ids for library entities

use std::collections::BTreeMap;

use super::formatting::is_keyword;
use crate::library::{MemberDef, MemberKind, NamespaceDef, ParameterDef, TypeDef, TypeKind};
use crate::model::Token;

/// Resolves type references in signatures to declared type line ids
#[derive(Debug, Default)]
pub struct TypeIndex {
    by_full_name: BTreeMap<String, String>,
    /// `None` when a simple name is declared more than once
    by_simple_name: BTreeMap<String, Option<String>>,
}

impl TypeIndex {
    pub fn new(namespaces: &[NamespaceDef]) -> Self {
        let mut index = TypeIndex::default();
        for ns in namespaces {
            for ty in &ns.types {
                index.register(&ns.name, ty);
            }
        }
        index
    }

    fn register(&mut self, container: &str, ty: &TypeDef) {
        if ty.name.is_empty() {
            return;
        }
        let full = qualify(container, &ty.name);
        let id = type_id(&full);
        self.by_full_name.insert(full.clone(), id.clone());
        self.by_simple_name
            .entry(ty.name.clone())
            .and_modify(|existing| {
                if existing.as_deref() != Some(id.as_str()) {
                    *existing = None;
                }
            })
            .or_insert_with(|| Some(id.clone()));
        for nested in &ty.nested_types {
            self.register(&full, nested);
        }
    }

    /// Line id of the declared type `name` refers to, if any
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_full_name
            .get(name)
            .map(String::as_str)
            .or_else(|| self.by_simple_name.get(name)?.as_deref())
    }
}

pub fn qualify(container: &str, name: &str) -> String {
    if container.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", container, name)
    }
}

pub fn namespace_id(name: &str) -> String {
    format!("N:{}", name)
}

pub fn type_id(full_name: &str) -> String {
    format!("T:{}", full_name)
}

/// Documentation-comment style member id, e.g. `M:Ns.Type.Run(System.Int32)`
pub fn member_id(type_full_name: &str, member: &MemberDef) -> String {
    let prefix = match member.member_kind() {
        Some(MemberKind::Constructor | MemberKind::Method) | None => "M",
        Some(MemberKind::Property) => "P",
        Some(MemberKind::Field | MemberKind::Constant | MemberKind::EnumValue) => "F",
        Some(MemberKind::Event) => "E",
    };
    let name = match member.member_kind() {
        Some(MemberKind::Constructor) => "#ctor",
        _ => member.name.as_str(),
    };
    let mut id = format!("{}:{}.{}", prefix, type_full_name, name);
    if matches!(
        member.member_kind(),
        Some(MemberKind::Constructor | MemberKind::Method) | None
    ) {
        let params: Vec<&str> = member
            .parameters
            .iter()
            .map(|p| p.type_name.as_deref().unwrap_or("?"))
            .collect();
        id.push('(');
        id.push_str(&params.join(","));
        id.push(')');
    }
    id
}

/// Tokens for a type reference such as `IList<Contoso.Widget>?`
pub fn type_ref_tokens(reference: &str, index: &TypeIndex) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if word.is_empty() {
            return;
        }
        let name = std::mem::take(word);
        let token = if is_keyword(&name) {
            Token::keyword(name)
        } else {
            match index.resolve(&name) {
                Some(target) => {
                    let target = target.to_string();
                    Token::type_name(name).navigate_to(target)
                }
                None => Token::type_name(name),
            }
        };
        tokens.push(token);
    };

    for c in reference.trim().chars() {
        if c.is_alphanumeric() || matches!(c, '_' | '.' | '@') {
            word.push(c);
        } else {
            flush(&mut word, &mut tokens);
            if c.is_whitespace() {
                tokens.push(Token::space());
            } else {
                tokens.push(Token::punctuation(c.to_string()));
            }
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn push_modifiers(tokens: &mut Vec<Token>, modifiers: &[String]) {
    for modifier in modifiers {
        tokens.push(Token::keyword(modifier.as_str()));
        tokens.push(Token::space());
    }
}

fn push_generic_parameters(tokens: &mut Vec<Token>, parameters: &[String]) {
    if parameters.is_empty() {
        return;
    }
    tokens.push(Token::punctuation("<"));
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::punctuation(","));
            tokens.push(Token::space());
        }
        tokens.push(Token::type_name(parameter.as_str()));
    }
    tokens.push(Token::punctuation(">"));
}

/// Problems found while emitting a declaration; reported, never fatal
pub type Problems = Vec<String>;

fn push_parameters(
    tokens: &mut Vec<Token>,
    parameters: &[ParameterDef],
    index: &TypeIndex,
    problems: &mut Problems,
) {
    tokens.push(Token::punctuation("("));
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::punctuation(","));
            tokens.push(Token::space());
        }
        push_modifiers(tokens, &parameter.modifiers);
        match parameter.type_name.as_deref() {
            Some(type_name) if !type_name.trim().is_empty() => {
                tokens.extend(type_ref_tokens(type_name, index));
            }
            _ => {
                problems.push(format!("parameter {} has no type", i));
                tokens.push(Token::text("?"));
            }
        }
        tokens.push(Token::space());
        if parameter.name.is_empty() {
            tokens.push(Token::text(format!("arg{}", i)));
        } else {
            tokens.push(Token::text(parameter.name.as_str()));
        }
        if let Some(default) = &parameter.default {
            tokens.push(Token::space());
            tokens.push(Token::punctuation("="));
            tokens.push(Token::space());
            tokens.push(Token::literal(default.as_str()));
        }
    }
    tokens.push(Token::punctuation(")"));
}

fn push_return_type(
    tokens: &mut Vec<Token>,
    return_type: Option<&str>,
    index: &TypeIndex,
    problems: &mut Problems,
) {
    match return_type {
        Some(t) if !t.trim().is_empty() => tokens.extend(type_ref_tokens(t, index)),
        _ => {
            problems.push("missing return type".to_string());
            tokens.push(Token::text("?"));
        }
    }
    tokens.push(Token::space());
}

fn push_problems(tokens: &mut Vec<Token>, problems: &Problems) {
    if problems.is_empty() {
        return;
    }
    tokens.push(Token::space());
    tokens.push(Token::comment(format!("/* {} */", problems.join("; "))));
}

/// Declaration tokens of a type heading (no indentation)
///
/// `TypeBody::Open` appends ` {`; an empty type gets ` { }` instead.
/// Delegates ignore `body` and end with `;`.
pub fn type_declaration(
    ty: &TypeDef,
    index: &TypeIndex,
    body: TypeBody,
    problems: &mut Problems,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_modifiers(&mut tokens, &ty.modifiers);

    let kind = ty.type_kind();
    match kind {
        Some(kind) => {
            tokens.push(Token::keyword(kind.keyword()));
            tokens.push(Token::space());
        }
        None => problems.push(format!("unrecognized type kind '{}'", ty.kind)),
    }

    if kind == Some(TypeKind::Delegate) {
        push_return_type(&mut tokens, ty.return_type.as_deref(), index, problems);
    }

    if ty.name.is_empty() {
        problems.push("type has no name".to_string());
        tokens.push(Token::type_name("?"));
    } else {
        tokens.push(Token::type_name(ty.name.as_str()));
    }
    push_generic_parameters(&mut tokens, &ty.generic_parameters);

    if kind == Some(TypeKind::Delegate) {
        push_parameters(&mut tokens, &ty.parameters, index, problems);
        tokens.push(Token::punctuation(";"));
        push_problems(&mut tokens, problems);
        return tokens;
    }

    if !ty.base_types.is_empty() {
        tokens.push(Token::space());
        tokens.push(Token::punctuation(":"));
        tokens.push(Token::space());
        for (i, base) in ty.base_types.iter().enumerate() {
            if i > 0 {
                tokens.push(Token::punctuation(","));
                tokens.push(Token::space());
            }
            tokens.extend(type_ref_tokens(base, index));
        }
    }

    match body {
        TypeBody::Open => {
            tokens.push(Token::space());
            tokens.push(Token::punctuation("{"));
        }
        TypeBody::Empty => {
            tokens.push(Token::space());
            tokens.push(Token::punctuation("{"));
            tokens.push(Token::space());
            tokens.push(Token::punctuation("}"));
        }
    }
    push_problems(&mut tokens, problems);
    tokens
}

/// Whether a type heading opens a body rendered on following lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeBody {
    Open,
    Empty,
}

/// Declaration tokens of a member (no indentation)
pub fn member_declaration(
    member: &MemberDef,
    declaring_type: &str,
    index: &TypeIndex,
    problems: &mut Problems,
) -> Vec<Token> {
    let mut tokens = Vec::new();
    push_modifiers(&mut tokens, &member.modifiers);

    let name = if member.name.is_empty() {
        problems.push("member has no name".to_string());
        "?"
    } else {
        member.name.as_str()
    };

    match member.member_kind() {
        Some(MemberKind::Constructor) => {
            tokens.push(Token::member_name(declaring_type));
            push_parameters(&mut tokens, &member.parameters, index, problems);
            tokens.push(Token::punctuation(";"));
        }
        Some(MemberKind::Method) => {
            push_return_type(&mut tokens, member.return_type.as_deref(), index, problems);
            tokens.push(Token::member_name(name));
            push_generic_parameters(&mut tokens, &member.generic_parameters);
            push_parameters(&mut tokens, &member.parameters, index, problems);
            tokens.push(Token::punctuation(";"));
        }
        Some(MemberKind::Property) => {
            push_return_type(&mut tokens, member.return_type.as_deref(), index, problems);
            tokens.push(Token::member_name(name));
            tokens.push(Token::space());
            tokens.push(Token::punctuation("{"));
            let accessors: Vec<&str> = if member.accessors.is_empty() {
                vec!["get"]
            } else {
                member.accessors.iter().map(String::as_str).collect()
            };
            for accessor in accessors {
                tokens.push(Token::space());
                tokens.push(Token::keyword(accessor));
                tokens.push(Token::punctuation(";"));
            }
            tokens.push(Token::space());
            tokens.push(Token::punctuation("}"));
        }
        Some(MemberKind::Field | MemberKind::Constant) => {
            push_return_type(&mut tokens, member.return_type.as_deref(), index, problems);
            tokens.push(Token::member_name(name));
            if let Some(value) = &member.value {
                tokens.push(Token::space());
                tokens.push(Token::punctuation("="));
                tokens.push(Token::space());
                tokens.push(Token::literal(value.as_str()));
            } else if member.member_kind() == Some(MemberKind::Constant) {
                problems.push("constant has no value".to_string());
            }
            tokens.push(Token::punctuation(";"));
        }
        Some(MemberKind::Event) => {
            tokens.push(Token::keyword("event"));
            tokens.push(Token::space());
            push_return_type(&mut tokens, member.return_type.as_deref(), index, problems);
            tokens.push(Token::member_name(name));
            tokens.push(Token::punctuation(";"));
        }
        Some(MemberKind::EnumValue) => {
            tokens.push(Token::member_name(name));
            if let Some(value) = &member.value {
                tokens.push(Token::space());
                tokens.push(Token::punctuation("="));
                tokens.push(Token::space());
                tokens.push(Token::literal(value.as_str()));
            }
            tokens.push(Token::punctuation(","));
        }
        None => {
            problems.push(format!("unrecognized member kind '{}'", member.kind));
            tokens.push(Token::member_name(name));
            tokens.push(Token::punctuation(";"));
        }
    }

    push_problems(&mut tokens, problems);
    tokens
}

/// Tokens for an attribute line such as `[Obsolete("use Run2")]`
pub fn attribute_tokens(attribute: &str) -> Vec<Token> {
    let attribute = attribute.trim();
    let inner = attribute
        .strip_prefix('[')
        .and_then(|a| a.strip_suffix(']'))
        .unwrap_or(attribute);
    vec![
        Token::punctuation("["),
        Token::annotation(inner),
        Token::punctuation("]"),
    ]
}
