//! Configuration for swpack.
//!
//! Two layers:
//!
//! - [`Options`] is the library-level entry list, built in code or from a file.
//! - [`HostConfig`] is the host's resolved configuration (root, command, mode,
//!   define values). It is passed explicitly to the plugin components.
//!
//! ## Config file
//!
//! `swpack.json` in the project root:
//!
//! ```json
//! {
//!   "entries": [
//!     { "src": "src/sw.ts", "dist": "/sw.js", "version": { "hash": ["src/sw.ts"] } },
//!     { "src": "src/push.ts", "dist": "push.js", "index": 1 }
//!   ],
//!   "define": { "__API__": "\"/api\"" }
//! }
//! ```

use crate::entry::EntryOptions;
use crate::error::{Error, Result};
use crate::versions::VersionGenerator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &["swpack.json", ".swpackrc.json"];

/// Module imported ahead of a served entry when the host injects define values.
pub const DEFAULT_ENV_MODULE: &str = "/@vite/env";

/// Which host pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Production bundling pass.
    #[default]
    Build,
    /// Local development server.
    Serve,
}

/// Build mode of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Production,
    Development,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }

    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown mode `{other}`")),
        }
    }
}

/// The host's resolved configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Project root; relative entry sources and `node_modules` live here.
    pub root: PathBuf,
    /// Which pass is running.
    pub command: Command,
    /// Build mode.
    pub mode: Mode,
    /// Compile-time define values of the host.
    pub define: BTreeMap<String, String>,
    /// Environment shim imported ahead of served entries when `define` is set.
    pub env_module: String,
}

impl HostConfig {
    /// Production build rooted at `root`.
    pub fn build(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            command: Command::Build,
            mode: Mode::Production,
            define: BTreeMap::new(),
            env_module: DEFAULT_ENV_MODULE.to_string(),
        }
    }

    /// Development server rooted at `root`.
    pub fn serve(root: impl Into<PathBuf>) -> Self {
        Self {
            command: Command::Serve,
            mode: Mode::Development,
            ..Self::build(root)
        }
    }

    /// Set the build mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a define value.
    #[must_use]
    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.define.insert(key.into(), value.into());
        self
    }
}

/// Worker entries to build.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub entries: Vec<EntryOptions>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    #[must_use]
    pub fn entry(mut self, entry: EntryOptions) -> Self {
        self.entries.push(entry);
        self
    }
}

/// How a config-file entry obtains its version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSource {
    /// A literal version string.
    Fixed(String),
    /// An environment variable read at build time.
    Env(String),
    /// A content hash of the listed files, relative to the root.
    Hash(Vec<PathBuf>),
}

impl VersionSource {
    fn into_generator(self, root: &Path) -> VersionGenerator {
        match self {
            Self::Fixed(version) => VersionGenerator::fixed(version),
            Self::Env(var) => VersionGenerator::env(var),
            Self::Hash(files) => {
                VersionGenerator::hash_files(files.into_iter().map(|f| root.join(f)).collect())
            }
        }
    }
}

/// One entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub src: PathBuf,
    pub dist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSource>,
}

/// The `swpack.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwpackConfig {
    pub entries: Vec<EntryConfig>,
    /// Define values, used to decide whether the env shim is injected.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub define: BTreeMap<String, String>,
    /// Override for the env shim module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_module: Option<String>,
}

impl SwpackConfig {
    /// Convert to library options; version sources resolve relative to `root`.
    #[must_use]
    pub fn options(&self, root: &Path) -> Options {
        let entries = self
            .entries
            .iter()
            .cloned()
            .map(|e| {
                let mut opts = EntryOptions::new(e.src, e.dist);
                opts.index = e.index;
                opts.version = e.version.map(|v| v.into_generator(root));
                opts
            })
            .collect();
        Options { entries }
    }

    /// Host configuration for `command`/`mode`, carrying this file's define values.
    #[must_use]
    pub fn host(&self, root: &Path, command: Command, mode: Mode) -> HostConfig {
        HostConfig {
            root: root.to_path_buf(),
            command,
            mode,
            define: self.define.clone(),
            env_module: self
                .env_module
                .clone()
                .unwrap_or_else(|| DEFAULT_ENV_MODULE.to_string()),
        }
    }
}

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the config file.
///
/// If `config_path` is `Some`, use that file (relative paths resolve against
/// `root`). Otherwise auto-discover; `Ok(None)` when there is none.
pub fn load_config(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, SwpackConfig)>> {
    let path = match config_path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
        path: path.clone(),
        source,
    })?;

    Ok(Some((path, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        fs::write(dir.path().join(".swpackrc.json"), "{}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join(".swpackrc.json")
        );

        // swpack.json takes priority
        fs::write(dir.path().join("swpack.json"), "{}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("swpack.json")
        );
    }

    #[test]
    fn test_parse_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("swpack.json"),
            r#"{
                "entries": [
                    {"src": "src/sw.ts", "dist": "/sw.js", "version": {"hash": ["src/sw.ts"]}},
                    {"src": "src/push.ts", "dist": "push.js", "index": 4, "version": {"fixed": "2"}},
                    {"src": "src/sync.ts", "dist": "sync.js", "version": {"env": "GIT_SHA"}}
                ],
                "define": {"__API__": "\"/api\""}
            }"#,
        )
        .unwrap();

        let (path, config) = load_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("swpack.json"));
        assert_eq!(config.entries.len(), 3);
        assert_eq!(config.entries[0].dist, "/sw.js");
        assert_eq!(
            config.entries[0].version,
            Some(VersionSource::Hash(vec![PathBuf::from("src/sw.ts")]))
        );
        assert_eq!(config.entries[1].index, Some(4));
        assert_eq!(
            config.entries[2].version,
            Some(VersionSource::Env("GIT_SHA".to_string()))
        );

        let options = config.options(dir.path());
        assert_eq!(options.entries[1].index, Some(4));
        assert!(options.entries[1].version.is_some());

        let host = config.host(dir.path(), Command::Serve, Mode::Development);
        assert_eq!(host.define.get("__API__").map(String::as_str), Some("\"/api\""));
        assert_eq!(host.env_module, DEFAULT_ENV_MODULE);
    }

    #[tokio::test]
    async fn test_fixed_version_from_config() {
        let config: SwpackConfig = serde_json::from_str(
            r#"{"entries": [{"src": "sw.ts", "dist": "sw.js", "version": {"fixed": "9.9"}}]}"#,
        )
        .unwrap();
        let options = config.options(Path::new("/project"));
        let generator = options.entries[0].version.as_ref().unwrap();
        assert_eq!(generator.generate().await.unwrap(), "9.9");
    }

    #[test]
    fn test_no_config() {
        let dir = tempdir().unwrap();
        assert!(load_config(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempdir().unwrap();
        let err = load_config(dir.path(), Some(Path::new("custom.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("swpack.json"), r#"{"entries": [{"src": 1}]}"#).unwrap();
        assert!(matches!(
            load_config(dir.path(), None),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("production".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!("dev".parse::<Mode>().unwrap(), Mode::Development);
        assert!("staging".parse::<Mode>().is_err());
    }

    #[test]
    fn test_host_config_builders() {
        let host = HostConfig::serve("/project").define("__DEV__", "true");
        assert_eq!(host.command, Command::Serve);
        assert_eq!(host.mode, Mode::Development);
        assert_eq!(host.define.len(), 1);

        let host = HostConfig::build("/project").with_mode(Mode::Development);
        assert_eq!(host.command, Command::Build);
        assert!(!host.mode.is_production());
    }
}
