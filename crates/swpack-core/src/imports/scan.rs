//! Top-level import declaration scanner.
//!
//! Walks the source bytes once, skipping comments, strings, template literals
//! and regular expression literals, and tracking bracket depth so that only
//! declarations at depth zero are reported. Dynamic `import()` and
//! `import.meta` are not declarations and are skipped, as are `export ... from`
//! re-exports.

use super::{ImportParser, ImportSpan};
use crate::error::Result;
use std::path::Path;

/// Default [`ImportParser`] backed by [`scan_imports`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportScanner;

impl ImportParser for ImportScanner {
    fn parse_imports(&self, _path: &Path, source: &str) -> Result<Vec<ImportSpan>> {
        Ok(scan_imports(source))
    }
}

/// Scan source code for top-level import declarations.
///
/// Returns one span per declaration, in source order. Duplicates are kept:
/// every declaration is rewritten independently.
#[must_use]
pub fn scan_imports(source: &str) -> Vec<ImportSpan> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut results = Vec::new();
    let mut depth: usize = 0;
    let mut prev: Option<u8> = None;
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if b == b'/' && i + 1 < len && (bytes[i + 1] == b'/' || bytes[i + 1] == b'*') {
            i = skip_comment(bytes, i);
            continue;
        }

        match b {
            b'\'' | b'"' => {
                i = skip_string(bytes, i);
                prev = Some(b);
                continue;
            }
            b'`' => {
                i = skip_template(bytes, i);
                prev = Some(b);
                continue;
            }
            b'/' if regex_allowed(prev) => {
                i = skip_regex(bytes, i);
                prev = Some(b);
                continue;
            }
            b'{' | b'(' | b'[' => depth += 1,
            b'}' | b')' | b']' => depth = depth.saturating_sub(1),
            b'i' if depth == 0 && matches_keyword(bytes, i, b"import") => {
                if let Some((span, end)) = scan_import_declaration(source, i + 6) {
                    results.push(span);
                    i = end;
                    prev = Some(b'\'');
                    continue;
                }
            }
            _ => {}
        }

        prev = Some(b);
        i += 1;
    }

    results
}

/// Scan what follows the `import` keyword for the declaration's specifier.
/// Returns the span and the position just past it.
fn scan_import_declaration(source: &str, start: usize) -> Option<(ImportSpan, usize)> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = skip_trivia(bytes, start);

    match bytes.get(i) {
        // import("x") and import.meta are expressions
        Some(b'(' | b'.') | None => return None,
        // import "./side-effect"
        Some(b'\'' | b'"') => return literal_span(source, i),
        _ => {}
    }

    while i < len {
        match bytes[i] {
            b';' | b'=' => return None,
            b'\'' | b'"' => {
                // Quoted export name: import { "a-b" as ab } from "./x"
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if i + 1 < len && (bytes[i + 1] == b'/' || bytes[i + 1] == b'*') => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'f' if matches_keyword(bytes, i, b"from") => {
                let after = skip_trivia(bytes, i + 4);
                if matches!(bytes.get(after), Some(b'\'' | b'"')) {
                    return literal_span(source, after);
                }
                // `from` used as a binding name: import { from } from "./x"
                i = after;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn literal_span(source: &str, start: usize) -> Option<(ImportSpan, usize)> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return None,
            c if c == quote => {
                let end = i + 1;
                return Some((ImportSpan::new(start, &source[start..end]), end));
            }
            _ => i += 1,
        }
    }
    None
}

/// Check if bytes at position match a keyword (with word boundary).
/// A preceding `.` disqualifies member accesses like `foo.import`.
fn matches_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    if !bytes[pos..].starts_with(keyword) {
        return false;
    }
    if pos > 0 && (is_ident_byte(bytes[pos - 1]) || bytes[pos - 1] == b'.') {
        return false;
    }
    bytes
        .get(pos + keyword.len())
        .map_or(true, |&b| !is_ident_byte(b))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn skip_trivia(bytes: &[u8], mut i: usize) -> usize {
    let len = bytes.len();
    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i + 1 < len && bytes[i] == b'/' && (bytes[i + 1] == b'/' || bytes[i + 1] == b'*') {
            i = skip_comment(bytes, i);
        } else {
            return i;
        }
    }
}

fn skip_comment(bytes: &[u8], i: usize) -> usize {
    let len = bytes.len();
    if bytes[i + 1] == b'/' {
        let mut j = i + 2;
        while j < len && bytes[j] != b'\n' {
            j += 1;
        }
        j
    } else {
        let mut j = i + 2;
        while j + 1 < len && !(bytes[j] == b'*' && bytes[j + 1] == b'/') {
            j += 1;
        }
        (j + 2).min(len)
    }
}

fn skip_string(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn skip_template(bytes: &[u8], i: usize) -> usize {
    let len = bytes.len();
    let mut j = i + 1;
    while j < len {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => return j + 1,
            b'$' if bytes.get(j + 1) == Some(&b'{') => j = skip_substitution(bytes, j + 2),
            _ => j += 1,
        }
    }
    len
}

/// Skip a `${ ... }` body, returning the position after its closing brace.
fn skip_substitution(bytes: &[u8], i: usize) -> usize {
    let len = bytes.len();
    let mut depth = 1usize;
    let mut j = i;
    while j < len {
        match bytes[j] {
            b'\'' | b'"' => j = skip_string(bytes, j),
            b'`' => j = skip_template(bytes, j),
            b'/' if j + 1 < len && (bytes[j + 1] == b'/' || bytes[j + 1] == b'*') => {
                j = skip_comment(bytes, j);
            }
            b'{' => {
                depth += 1;
                j += 1;
            }
            b'}' => {
                depth -= 1;
                j += 1;
                if depth == 0 {
                    return j;
                }
            }
            _ => j += 1,
        }
    }
    len
}

/// A `/` starts a regex literal unless it follows an operand.
fn regex_allowed(prev: Option<u8>) -> bool {
    match prev {
        None => true,
        Some(b) => b"(,=:[!&|?{};+-*%<>~^".contains(&b),
    }
}

fn skip_regex(bytes: &[u8], i: usize) -> usize {
    let len = bytes.len();
    let mut j = i + 1;
    let mut in_class = false;
    while j < len {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => return j + 1,
            _ => j += 1,
        }
    }
    len
}
