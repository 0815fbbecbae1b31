//! Virtual module loader.
//!
//! Answers loads for the identifiers produced by the import rewriter:
//!
//! - Path: read the revealed file directly.
//! - Bare subpath (`idb/build/wrap`): `node_modules/idb/build/wrap`, `.ts` probed first.
//! - Bare package (`idb`): the file named by `module` in `node_modules/idb/package.json`.
//!
//! Packages without a `module` field are not distributable as ES modules and
//! are rejected rather than guessed at.

use crate::entry::EntrySet;
use crate::error::{read_error, Error, Result};
use crate::reveal::probe_extension;
use crate::specifier::{classify, SpecifierKind};
use crate::virtual_id::VirtualId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Directory packages are installed into, under the project root.
pub const PACKAGES_DIR: &str = "node_modules";

/// Package manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// The fields of `package.json` the loader reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    /// ES module entry, relative to the package root.
    #[serde(default)]
    pub module: Option<String>,
}

/// Loads virtual modules for the entries of one build.
#[derive(Debug, Clone)]
pub struct VirtualModuleLoader {
    root: PathBuf,
    entries: Arc<EntrySet>,
}

impl VirtualModuleLoader {
    pub fn new(root: impl Into<PathBuf>, entries: Arc<EntrySet>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the text of a virtual module.
    pub async fn load(&self, id: &str) -> Result<String> {
        let virtual_id = VirtualId::parse(id)?;
        if self.entries.by_index(virtual_id.entry).is_none() {
            return Err(Error::UnknownEntry {
                id: id.to_string(),
                index: virtual_id.entry,
            });
        }

        let path = self.resolve(&virtual_id.specifier).await?;
        debug!(id, path = %path.display(), "loading worker module");
        read_file(&path).await
    }

    /// Resolve a rewritten specifier to the file to read.
    pub async fn resolve(&self, specifier: &str) -> Result<PathBuf> {
        match classify(specifier) {
            SpecifierKind::Path => Ok(PathBuf::from(specifier)),
            SpecifierKind::BareSubpath => {
                let target = self.root.join(PACKAGES_DIR).join(specifier);
                Ok(probe_extension(&target).await)
            }
            SpecifierKind::BarePackage => self.resolve_package(specifier).await,
        }
    }

    async fn resolve_package(&self, package: &str) -> Result<PathBuf> {
        let package_dir = self.root.join(PACKAGES_DIR).join(package);
        let manifest = read_manifest(&package_dir, package).await?;

        let module = manifest
            .module
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::UnsupportedModule {
                package: package.to_string(),
            })?;

        Ok(package_dir.join(module))
    }
}

/// Read and parse `<package_dir>/package.json`.
pub async fn read_manifest(package_dir: &Path, package: &str) -> Result<PackageManifest> {
    let path = package_dir.join(MANIFEST_FILE);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ManifestNotFound {
                package: package.to_string(),
                path,
            });
        }
        Err(e) => return Err(Error::Io(e)),
    };

    serde_json::from_str(&text).map_err(|source| Error::ManifestParse {
        package: package.to_string(),
        source,
    })
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| read_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryOptions;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn project() -> (TempDir, VirtualModuleLoader) {
        let dir = tempdir().unwrap();
        let entries = EntrySet::new(
            dir.path(),
            vec![
                EntryOptions::new("src/sw.ts", "sw.js"),
                EntryOptions::new("src/push.ts", "push.js"),
            ],
        )
        .unwrap();
        let loader = VirtualModuleLoader::new(dir.path(), Arc::new(entries));
        (dir, loader)
    }

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn test_load_path() {
        let (dir, loader) = project();
        write(dir.path(), "src/util.ts", "export const x = 1;");
        let id = VirtualId::new(0, dir.path().join("src/util.ts").to_string_lossy()).to_string();

        assert_eq!(loader.load(&id).await.unwrap(), "export const x = 1;");
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let (dir, loader) = project();
        let id = VirtualId::new(0, dir.path().join("src/gone.js").to_string_lossy()).to_string();

        assert!(matches!(
            loader.load(&id).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_package_module_field() {
        let (dir, loader) = project();
        write(
            dir.path(),
            "node_modules/idb/package.json",
            r#"{"name": "idb", "main": "build/index.cjs", "module": "build/index.js"}"#,
        );
        write(dir.path(), "node_modules/idb/build/index.js", "export const openDB = 1;");

        let code = loader.load("sw-import:1,idb").await.unwrap();
        assert_eq!(code, "export const openDB = 1;");
    }

    #[tokio::test]
    async fn test_load_scoped_package() {
        let (dir, loader) = project();
        write(
            dir.path(),
            "node_modules/@acme/cache/package.json",
            r#"{"module": "./esm/index.mjs"}"#,
        );
        write(dir.path(), "node_modules/@acme/cache/esm/index.mjs", "export {};");

        assert_eq!(loader.load("sw-import:0,@acme/cache").await.unwrap(), "export {};");
    }

    #[tokio::test]
    async fn test_package_without_module_field() {
        let (dir, loader) = project();
        write(
            dir.path(),
            "node_modules/legacy/package.json",
            r#"{"name": "legacy", "main": "index.js"}"#,
        );

        let err = loader.load("sw-import:0,legacy").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedModule { ref package } if package == "legacy"));
    }

    #[tokio::test]
    async fn test_package_without_manifest() {
        let (_dir, loader) = project();

        let err = loader.load("sw-import:0,missing-pkg").await.unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { ref package, .. } if package == "missing-pkg"));
    }

    #[tokio::test]
    async fn test_package_with_broken_manifest() {
        let (dir, loader) = project();
        write(dir.path(), "node_modules/broken/package.json", "{ not json");

        assert!(matches!(
            loader.load("sw-import:0,broken").await,
            Err(Error::ManifestParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_subpath_prefers_ts() {
        let (dir, loader) = project();
        write(dir.path(), "node_modules/idb/build/wrap.ts", "// ts");
        write(dir.path(), "node_modules/idb/build/wrap.js", "// js");

        assert_eq!(loader.load("sw-import:0,idb/build/wrap").await.unwrap(), "// ts");
    }

    #[tokio::test]
    async fn test_load_subpath_falls_back_to_js() {
        let (dir, loader) = project();
        write(dir.path(), "node_modules/idb/build/wrap.js", "// js");

        assert_eq!(loader.load("sw-import:0,idb/build/wrap").await.unwrap(), "// js");
    }

    #[tokio::test]
    async fn test_unknown_entry_index() {
        let (_dir, loader) = project();

        assert!(matches!(
            loader.load("sw-import:9,idb").await,
            Err(Error::UnknownEntry { index: 9, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_identifier() {
        let (_dir, loader) = project();

        assert!(matches!(
            loader.load("virtual:sw-plugin").await,
            Err(Error::MalformedIdentifier { .. })
        ));
    }
}
