//! Virtual module identifiers.
//!
//! Imports inside a worker entry are rewritten to `sw-import:<index>,<specifier>`
//! so the host routes their loads back to this crate instead of the main graph.

use crate::error::{Error, Result};
use std::fmt;

/// Reserved prefix of every virtual identifier.
pub const MARKER: &str = "sw-import:";

/// A decoded virtual identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualId {
    /// Index of the entry whose import produced this identifier.
    pub entry: usize,
    /// Resolved file path, or the bare specifier verbatim.
    pub specifier: String,
}

impl VirtualId {
    pub fn new(entry: usize, specifier: impl Into<String>) -> Self {
        Self {
            entry,
            specifier: specifier.into(),
        }
    }

    /// Whether `id` carries the virtual marker.
    #[must_use]
    pub fn is_virtual(id: &str) -> bool {
        id.starts_with(MARKER)
    }

    /// Decode `sw-import:<index>,<specifier>`.
    ///
    /// Only the first comma separates; specifiers may contain commas.
    pub fn parse(id: &str) -> Result<Self> {
        let malformed = || Error::MalformedIdentifier { id: id.to_string() };

        let body = id.strip_prefix(MARKER).ok_or_else(malformed)?;
        let (index, specifier) = body.split_once(',').ok_or_else(malformed)?;
        let entry = index.parse::<usize>().map_err(|_| malformed())?;
        if specifier.is_empty() {
            return Err(malformed());
        }

        Ok(Self::new(entry, specifier))
    }
}

impl fmt::Display for VirtualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MARKER}{},{}", self.entry, self.specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let id = VirtualId::new(0, "/project/src/util.ts");
        assert_eq!(id.to_string(), "sw-import:0,/project/src/util.ts");
    }

    #[test]
    fn test_decode_recovers_index_and_specifier() {
        let encoded = VirtualId::new(12, "idb/build/wrap").to_string();
        let decoded = VirtualId::parse(&encoded).unwrap();
        assert_eq!(decoded.entry, 12);
        assert_eq!(decoded.specifier, "idb/build/wrap");
    }

    #[test]
    fn test_decode_splits_on_first_comma() {
        let decoded = VirtualId::parse("sw-import:1,/odd,dir/file.ts").unwrap();
        assert_eq!(decoded.entry, 1);
        assert_eq!(decoded.specifier, "/odd,dir/file.ts");
    }

    #[test]
    fn test_is_virtual() {
        assert!(VirtualId::is_virtual("sw-import:0,idb"));
        assert!(!VirtualId::is_virtual("./sw-import:0,idb"));
        assert!(!VirtualId::is_virtual("virtual:sw-plugin"));
    }

    #[test]
    fn test_malformed() {
        for id in [
            "idb",
            "sw-import:",
            "sw-import:0",
            "sw-import:x,idb",
            "sw-import:-1,idb",
            "sw-import:0,",
        ] {
            assert!(
                matches!(VirtualId::parse(id), Err(Error::MalformedIdentifier { .. })),
                "{id} should be malformed"
            );
        }
    }
}
