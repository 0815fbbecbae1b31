//! File revealer.
//!
//! Import specifiers in worker sources usually omit the file extension. The
//! revealer finds the file a path-like specifier actually names by probing
//! for existence only: `.ts` first, then the path as written, then `.js`.
//!
//! When both `util.ts` and `util.js` exist, `util.ts` wins without a warning.

use crate::specifier::classify;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Source-type extension, probed first.
pub const SOURCE_EXTENSION: &str = "ts";

/// Plain extension used when no source-type file exists.
pub const FALLBACK_EXTENSION: &str = "js";

/// Reveal the on-disk path for `specifier` imported from a file in `entry_dir`.
///
/// Bare specifiers are returned verbatim; their resolution happens at load time.
pub async fn reveal(entry_dir: &Path, specifier: &str) -> String {
    if !classify(specifier).is_path() {
        return specifier.to_string();
    }

    let target = normalize(&entry_dir.join(specifier));
    probe_extension(&target).await.to_string_lossy().into_owned()
}

/// Pick the real file for an extensionless `path`.
///
/// Never fails: when nothing matches, the `.js` candidate is returned and the
/// miss surfaces later as a load error.
pub async fn probe_extension(path: &Path) -> PathBuf {
    let source = with_extra_extension(path, SOURCE_EXTENSION);
    if is_file(&source).await {
        return source;
    }

    if path.extension().is_some() && is_file(path).await {
        return path.to_path_buf();
    }

    with_extra_extension(path, FALLBACK_EXTENSION)
}

/// Append `.ext` to the full file name (`util.worker` → `util.worker.ts`).
fn with_extra_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Collapse `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_prefers_ts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("util.ts"), "").unwrap();
        fs::write(dir.path().join("util.js"), "").unwrap();

        let revealed = reveal(dir.path(), "./util").await;
        assert_eq!(revealed, dir.path().join("util.ts").to_string_lossy());
    }

    #[tokio::test]
    async fn test_falls_back_to_js_when_missing() {
        let dir = tempdir().unwrap();

        let revealed = reveal(dir.path(), "./missing").await;
        assert_eq!(revealed, dir.path().join("missing.js").to_string_lossy());
    }

    #[tokio::test]
    async fn test_keeps_explicit_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cache.js"), "").unwrap();

        let revealed = reveal(dir.path(), "./cache.js").await;
        assert_eq!(revealed, dir.path().join("cache.js").to_string_lossy());
    }

    #[tokio::test]
    async fn test_parent_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sw")).unwrap();
        fs::write(dir.path().join("shared.ts"), "").unwrap();

        let revealed = reveal(&dir.path().join("sw"), "../shared").await;
        assert_eq!(revealed, dir.path().join("shared.ts").to_string_lossy());
    }

    #[tokio::test]
    async fn test_bare_specifier_verbatim() {
        let dir = tempdir().unwrap();
        assert_eq!(reveal(dir.path(), "idb").await, "idb");
        assert_eq!(reveal(dir.path(), "idb/build/wrap").await, "idb/build/wrap");
    }

    #[tokio::test]
    async fn test_directory_is_not_a_match() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("lib.ts")).unwrap();

        let revealed = reveal(dir.path(), "./lib").await;
        assert_eq!(revealed, dir.path().join("lib.js").to_string_lossy());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }
}
