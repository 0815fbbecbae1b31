//! Import rewriting for worker entries.
//!
//! Every top-level import specifier in an entry is replaced with a virtual
//! identifier (`sw-import:<index>,<resolved>`), so that the host asks this
//! crate to load it instead of resolving it against the main module graph.
//!
//! ```text
//! import {x} from './util'      →  import {x} from 'sw-import:0,/project/src/util.ts'
//! import {openDB} from 'idb'    →  import {openDB} from 'sw-import:0,idb'
//! ```
//!
//! Replacements change the length of the text, so the splice position of
//! each later edit drifts by the accumulated delta of the earlier ones. The
//! edits are collected into an [`EditList`] and applied in one pass.

use crate::error::{Error, Result};
use crate::imports::ImportSpan;
use crate::reveal::reveal;
use crate::virtual_id::VirtualId;
use std::path::Path;
use tracing::debug;

/// One replacement of a span of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset in the original text.
    pub start: usize,
    /// Number of original bytes replaced.
    pub len: usize,
    /// Replacement text.
    pub text: String,
}

/// Where an edit landed in the rewritten text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEdit {
    /// Byte offset in the rewritten text (`start + delta`).
    pub start: usize,
    /// Length of the inserted text.
    pub len: usize,
    /// Accumulated length change before this edit.
    pub delta: isize,
}

/// Ordered, non-overlapping edits against one source text.
#[derive(Debug, Clone, Default)]
pub struct EditList {
    edits: Vec<Edit>,
}

impl EditList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edit. Edits must arrive in ascending, non-overlapping order.
    pub fn push(&mut self, start: usize, len: usize, text: impl Into<String>) -> Result<()> {
        if let Some(last) = self.edits.last() {
            if start < last.start + last.len {
                return Err(Error::InvalidSpan {
                    start,
                    reason: "overlaps or precedes the previous import",
                });
            }
        }
        self.edits.push(Edit {
            start,
            len,
            text: text.into(),
        });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply all edits to `source`, copying untouched regions verbatim.
    pub fn apply(&self, source: &str) -> Result<(String, Vec<AppliedEdit>)> {
        let growth: usize = self.edits.iter().map(|e| e.text.len()).sum();
        let mut out = String::with_capacity(source.len() + growth);
        let mut applied = Vec::with_capacity(self.edits.len());
        let mut cursor = 0;
        let mut delta: isize = 0;

        for edit in &self.edits {
            let end = edit.start + edit.len;
            if end > source.len() {
                return Err(Error::InvalidSpan {
                    start: edit.start,
                    reason: "extends past the end of the source",
                });
            }
            if !source.is_char_boundary(edit.start) || !source.is_char_boundary(end) {
                return Err(Error::InvalidSpan {
                    start: edit.start,
                    reason: "does not fall on a character boundary",
                });
            }

            out.push_str(&source[cursor..edit.start]);
            applied.push(AppliedEdit {
                start: edit.start.saturating_add_signed(delta),
                len: edit.text.len(),
                delta,
            });
            out.push_str(&edit.text);

            delta += signed(edit.text.len()) - signed(edit.len);
            cursor = end;
        }

        out.push_str(&source[cursor..]);
        Ok((out, applied))
    }
}

#[allow(clippy::cast_possible_wrap)]
fn signed(n: usize) -> isize {
    n as isize
}

/// Rewrite every import span of one entry into a virtual identifier literal.
///
/// `entry_path` is the entry's source file; path-like specifiers are revealed
/// relative to its directory. Bare specifiers are kept verbatim and resolved
/// when the virtual module is loaded.
pub async fn rewrite_imports(
    entry_index: usize,
    entry_path: &Path,
    source: &str,
    imports: &[ImportSpan],
) -> Result<String> {
    let entry_dir = entry_path.parent().unwrap_or(Path::new("."));
    let mut edits = EditList::new();

    for span in imports {
        if source.get(span.start..span.end()) != Some(span.raw.as_str()) {
            return Err(Error::InvalidSpan {
                start: span.start,
                reason: "literal text differs from the source",
            });
        }

        let resolved = reveal(entry_dir, span.specifier()).await;
        let quote = span.quote();
        let literal = format!("{quote}{}{quote}", VirtualId::new(entry_index, resolved));
        debug!(
            entry = entry_index,
            from = span.specifier(),
            to = %literal,
            "rewrote worker import"
        );
        edits.push(span.start, span.raw.len(), literal)?;
    }

    let (code, _) = edits.apply(source)?;
    Ok(code)
}
