//! Pass-through source formatting
//!
//! Declaration text carried verbatim in the metadata may contain two kinds
//! of region marker:
//!
//! - `/*-*/ ... /*-*/` strip: everything between the markers (newlines
//!   included) is dropped from the output.
//! - `/*+*/ ... /*+*/` preserve: the content is emitted exactly as written,
//!   as one literal token per line, untouched by whitespace clean-up.
//!
//! Markers themselves never appear in the output. An unterminated region
//! extends to the end of the text. Whitespace-only lines are collapsed;
//! every other line keeps its text exactly, trailing whitespace included.

use crate::model::Token;

pub const STRIP_MARKER: &str = "/*-*/";
pub const PRESERVE_MARKER: &str = "/*+*/";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "base", "bool", "byte", "case", "catch", "char", "class", "const",
    "decimal", "default", "delegate", "do", "double", "else", "enum", "event", "explicit",
    "extern", "false", "float", "for", "foreach", "get", "if", "implicit", "in", "init", "int",
    "interface", "internal", "is", "long", "namespace", "new", "null", "object", "operator",
    "out", "override", "params", "partial", "private", "protected", "public", "readonly",
    "record", "ref", "return", "sbyte", "sealed", "set", "short", "static", "string", "struct",
    "this", "throw", "true", "typeof", "uint", "ulong", "unsafe", "ushort", "using", "var",
    "virtual", "void", "volatile", "where", "while",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Piece of a formatted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Ordinary text, tokenized by the lexer
    Code(String),
    /// Verbatim text from a preserve region
    Preserved(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Strip,
    Preserve,
}

/// Apply strip/preserve markers and split into cleaned-up lines
pub fn apply_markers(source: &str) -> Vec<Vec<Segment>> {
    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];
    let mut mode = Mode::Normal;
    let mut rest = source;

    while !rest.is_empty() {
        let (text, next) = match mode {
            Mode::Normal => match next_marker(rest) {
                Some((at, marker)) => {
                    let next_mode = if marker == STRIP_MARKER {
                        Mode::Strip
                    } else {
                        Mode::Preserve
                    };
                    (&rest[..at], Some((at + marker.len(), next_mode)))
                }
                None => (rest, None),
            },
            Mode::Strip | Mode::Preserve => {
                let marker = if mode == Mode::Strip {
                    STRIP_MARKER
                } else {
                    PRESERVE_MARKER
                };
                match rest.find(marker) {
                    Some(at) => (&rest[..at], Some((at + marker.len(), Mode::Normal))),
                    None => (rest, None),
                }
            }
        };

        if mode != Mode::Strip {
            push_text(&mut lines, text, mode == Mode::Preserve);
        }

        match next {
            Some((advance, next_mode)) => {
                rest = &rest[advance..];
                mode = next_mode;
            }
            None => break,
        }
    }

    lines.into_iter().filter_map(clean_line).collect()
}

fn next_marker(text: &str) -> Option<(usize, &'static str)> {
    let strip = text.find(STRIP_MARKER).map(|at| (at, STRIP_MARKER));
    let preserve = text.find(PRESERVE_MARKER).map(|at| (at, PRESERVE_MARKER));
    match (strip, preserve) {
        (Some(s), Some(p)) => Some(if s.0 <= p.0 { s } else { p }),
        (s, p) => s.or(p),
    }
}

/// Append `text` to the current line, starting new lines at each `\n`
fn push_text(lines: &mut Vec<Vec<Segment>>, text: &str, preserved: bool) {
    for (i, piece) in text.split('\n').enumerate() {
        if i > 0 {
            lines.push(Vec::new());
        }
        let piece = piece.strip_suffix('\r').unwrap_or(piece);
        if piece.is_empty() {
            continue;
        }
        if let Some(current) = lines.last_mut() {
            current.push(if preserved {
                Segment::Preserved(piece.to_string())
            } else {
                Segment::Code(piece.to_string())
            });
        }
    }
}

/// Drop lines left with nothing to show; everything else is kept as written
fn clean_line(segments: Vec<Segment>) -> Option<Vec<Segment>> {
    let visible = segments.iter().any(|s| match s {
        Segment::Code(text) => !text.trim().is_empty(),
        Segment::Preserved(_) => true,
    });
    visible.then_some(segments)
}

/// Tokenize one formatted line
pub fn line_tokens(segments: &[Segment]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Code(text) => tokens.extend(lex(text, i == 0)),
            Segment::Preserved(text) => tokens.push(Token::literal(text.as_str())),
        }
    }
    tokens
}

/// Lossless lexer: concatenating the token values yields the input
///
/// Leading whitespace is formatting and marked skip-diff when
/// `line_start` is set.
pub fn lex(text: &str, line_start: bool) -> Vec<Token> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let end_of = |i: usize| chars.get(i).map_or(text.len(), |(at, _)| *at);
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        let mut j = i + 1;

        let token = if c.is_whitespace() {
            while j < chars.len() && chars[j].1.is_whitespace() {
                j += 1;
            }
            let token = Token::new(crate::model::TokenKind::Whitespace, &text[start..end_of(j)]);
            if line_start && start == 0 {
                token.skip_diff()
            } else {
                token
            }
        } else if c == '/' && chars.get(j).map(|(_, n)| *n) == Some('/') {
            j = chars.len();
            Token::comment(&text[start..])
        } else if c == '"' || c == '\'' {
            while j < chars.len() {
                let d = chars[j].1;
                j += 1;
                if d == '\\' {
                    j += 1;
                } else if d == c {
                    break;
                }
            }
            let j_end = end_of(j.min(chars.len()));
            Token::literal(&text[start..j_end])
        } else if c.is_ascii_digit() {
            while j < chars.len() && (chars[j].1.is_alphanumeric() || matches!(chars[j].1, '.' | '_'))
            {
                j += 1;
            }
            Token::literal(&text[start..end_of(j)])
        } else if c.is_alphabetic() || c == '_' || c == '@' {
            while j < chars.len() && (chars[j].1.is_alphanumeric() || chars[j].1 == '_') {
                j += 1;
            }
            let word = &text[start..end_of(j)];
            if is_keyword(word) {
                Token::keyword(word)
            } else {
                Token::text(word)
            }
        } else {
            Token::punctuation(&text[start..end_of(j)])
        };

        tokens.push(token);
        i = j.min(chars.len());
    }

    tokens
}
