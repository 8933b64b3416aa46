//! Quoting rules used when rendering an AST back to query text.

use crate::ast::tokens::{lookup, TokenKind};

/// Single-quote a string literal, escaping newlines, backslashes and quotes.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Render an identifier, double-quoting it when it would not scan back as
/// the same bare identifier.
pub fn quote_ident(ident: &str) -> String {
    if !ident_needs_quotes(ident) {
        return ident.to_string();
    }
    let mut out = String::with_capacity(ident.len() + 2);
    out.push('"');
    for ch in ident.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape the regex delimiter so the pattern can sit between slashes.
pub fn quote_regex(pattern: &str) -> String {
    format!("/{}/", pattern.replace('/', "\\/"))
}

pub fn is_ident_first_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Tag addresses such as `NM:i` are single identifiers, hence `:`.
pub fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == ':'
}

fn ident_needs_quotes(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) if is_ident_first_char(first) => {}
        _ => return true,
    }
    !chars.all(is_ident_char) || lookup(ident) != TokenKind::Ident
}
