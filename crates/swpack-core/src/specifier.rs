//! Import specifier classification.
//!
//! ## Specifier Types
//!
//! - Path: `./utils`, `../lib/foo`, `/abs/path/to/module`
//! - Bare subpath: `idb/build/wrap`, `@scope/pkg/sub`
//! - Bare package: `idb`, `@scope/pkg`
//!
//! Specifiers shorter than two characters are always bare package names.

/// The kind of an import specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// Relative (`./`, `../`) or absolute (`/`) file path.
    Path,
    /// Bare specifier naming a file inside a package (`pkg/sub`).
    BareSubpath,
    /// Bare specifier naming a package root (`pkg`).
    BarePackage,
}

impl SpecifierKind {
    /// Whether the specifier points at a file path.
    #[must_use]
    pub fn is_path(self) -> bool {
        self == Self::Path
    }
}

/// Classify an import specifier (without quotes).
#[must_use]
pub fn classify(specifier: &str) -> SpecifierKind {
    if specifier.len() < 2 {
        return SpecifierKind::BarePackage;
    }

    if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
    {
        return SpecifierKind::Path;
    }

    // `..` alone reaches the parent directory's index; `.` alone has length 1.
    if specifier == ".." {
        return SpecifierKind::Path;
    }

    if package_name(specifier).len() < specifier.len() {
        SpecifierKind::BareSubpath
    } else {
        SpecifierKind::BarePackage
    }
}

/// The package root portion of a bare specifier.
///
/// `idb/build/wrap` → `idb`, `@scope/pkg/sub` → `@scope/pkg`, `idb` → `idb`.
#[must_use]
pub fn package_name(specifier: &str) -> &str {
    let mut slashes = specifier.match_indices('/').map(|(i, _)| i);
    let cut = if specifier.starts_with('@') {
        slashes.nth(1)
    } else {
        slashes.next()
    };
    match cut {
        Some(i) => &specifier[..i],
        None => specifier,
    }
}
