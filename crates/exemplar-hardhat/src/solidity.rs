//! Just enough Solidity lexing to find declared contract names.
//!
//! Comments and string literals are blanked out first so that a `contract`
//! inside either is never mistaken for a declaration.

/// Replace comments and string literal contents with spaces, keeping line
/// structure intact.
pub fn strip_comments_and_strings(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            '"' | '\'' => {
                let quote = c;
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        break;
                    }
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Names of every `contract` declaration (abstract included), in source order.
/// Interfaces and libraries are not contracts.
pub fn declared_contracts(source: &str) -> Vec<String> {
    let cleaned = strip_comments_and_strings(source);
    let mut tokens = cleaned
        .split(|c: char| !is_ident_char(c))
        .filter(|t| !t.is_empty());

    let mut names = Vec::new();
    while let Some(token) = tokens.next() {
        if token == "contract" {
            if let Some(name) = tokens.next() {
                if name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$') {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}
