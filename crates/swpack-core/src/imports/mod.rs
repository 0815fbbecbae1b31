//! Import discovery for worker entry sources.
//!
//! Parsing is a seam: hosts with a real parser implement [`ImportParser`];
//! [`ImportScanner`] is a lightweight default that finds top-level import
//! declarations without building an AST.

mod scan;

pub use scan::{scan_imports, ImportScanner};

use crate::error::Result;
use std::path::Path;

/// The specifier literal of one import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpan {
    /// Byte offset of the literal's opening quote in the original source.
    pub start: usize,
    /// Literal text including both quotes, e.g. `'./util'`.
    pub raw: String,
}

impl ImportSpan {
    pub fn new(start: usize, raw: impl Into<String>) -> Self {
        Self {
            start,
            raw: raw.into(),
        }
    }

    /// Byte offset just past the closing quote.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.raw.len()
    }

    /// The quote character the literal was written with.
    #[must_use]
    pub fn quote(&self) -> char {
        self.raw.chars().next().unwrap_or('"')
    }

    /// The specifier without quotes.
    #[must_use]
    pub fn specifier(&self) -> &str {
        let quote_len = self.quote().len_utf8();
        if self.raw.len() < 2 * quote_len {
            return "";
        }
        &self.raw[quote_len..self.raw.len() - quote_len]
    }
}

/// Source parser that locates top-level import declarations.
///
/// Implementations must return spans in source order.
pub trait ImportParser: Send + Sync {
    /// Find the specifier literal of every top-level `import` declaration.
    fn parse_imports(&self, path: &Path, source: &str) -> Result<Vec<ImportSpan>>;
}
