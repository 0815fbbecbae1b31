//! Development passthrough plugin.
//!
//! Serves each worker entry verbatim under `/<destination>`: no rewriting,
//! no bundling, version placeholder replaced with `dev`.

use crate::config::HostConfig;
use crate::entry::EntrySet;
use crate::error::{read_error, Error};
use crate::plugin::{
    HookResult, LoadResult, Plugin, PluginApply, PluginEnforce, PluginError, ResolveIdResult,
};
use crate::versions::{stamp_placeholder, DEV_VERSION};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::debug;

pub const NAME: &str = "sw-plugin:dev";

/// Serve-command half of the worker pipeline.
pub struct DevPlugin {
    entries: Arc<EntrySet>,
    /// Import line prepended to entries when the host injects define values.
    env_import: Option<String>,
}

impl DevPlugin {
    pub fn new(host: &HostConfig, entries: Arc<EntrySet>) -> Self {
        let env_import =
            (!host.define.is_empty()).then(|| format!("import '{}'\n\n", host.env_module));
        Self {
            entries,
            env_import,
        }
    }

    /// Entry text as served in development.
    fn serve_text(&self, source: &str) -> String {
        let stamped = stamp_placeholder(source, DEV_VERSION);
        match &self.env_import {
            Some(prefix) => format!("{prefix}{stamped}"),
            None => stamped,
        }
    }
}

impl Plugin for DevPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Pre
    }

    fn apply(&self) -> PluginApply {
        PluginApply::Serve
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        let Some(destination) = specifier.strip_prefix('/') else {
            return Ok(None);
        };
        Ok(self
            .entries
            .iter()
            .find(|e| e.destination() == destination)
            .map(|e| ResolveIdResult::resolved(e.source().to_string_lossy())))
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HookResult<Option<LoadResult>>> {
        async move {
            let Some(entry) = self.entries.by_source(id) else {
                return Ok(None);
            };
            let source = tokio::fs::read_to_string(entry.source())
                .await
                .map_err(|e| read_error(entry.source(), e))
                .map_err(|e: Error| PluginError::new(NAME, "load", e))?;
            debug!(destination = entry.destination(), "serving worker entry");
            Ok(Some(LoadResult::code(self.serve_text(&source))))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryOptions;
    use crate::versions::VersionGenerator;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const WORKER: &str = "const VERSION = '%SW_VERSION%';\nimport {x} from './util';\n";

    fn setup(host: impl FnOnce(&std::path::Path) -> HostConfig) -> (TempDir, DevPlugin) {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/sw.ts"), WORKER).unwrap();

        let entries = EntrySet::new(
            dir.path(),
            vec![EntryOptions::new("src/sw.ts", "/sw.js")
                .version(VersionGenerator::fixed("never-used"))],
        )
        .unwrap();
        let plugin = DevPlugin::new(&host(dir.path()), Arc::new(entries));
        (dir, plugin)
    }

    #[test]
    fn test_resolve_destination_url() {
        let (dir, plugin) = setup(|root| HostConfig::serve(root));

        let resolved = plugin.resolve_id("/sw.js", None).unwrap().unwrap();
        assert_eq!(resolved.id, dir.path().join("src/sw.ts").to_string_lossy());

        assert!(plugin.resolve_id("sw.js", None).unwrap().is_none());
        assert!(plugin.resolve_id("/app.js", None).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_serves_dev_version_verbatim() {
        let (dir, plugin) = setup(|root| HostConfig::serve(root));
        let id = dir.path().join("src/sw.ts");

        let loaded = plugin.load(&id.to_string_lossy()).await.unwrap().unwrap();
        assert_eq!(
            loaded.code,
            "const VERSION = 'dev';\nimport {x} from './util';\n"
        );
    }

    #[tokio::test]
    async fn test_load_prepends_env_import_with_define() {
        let (dir, plugin) = setup(|root| HostConfig::serve(root).define("__API__", "\"/api\""));
        let id = dir.path().join("src/sw.ts");

        let loaded = plugin.load(&id.to_string_lossy()).await.unwrap().unwrap();
        assert!(loaded.code.starts_with("import '/@vite/env'\n\nconst VERSION = 'dev';"));
    }

    #[tokio::test]
    async fn test_load_ignores_other_modules() {
        let (dir, plugin) = setup(|root| HostConfig::serve(root));
        let other = dir.path().join("src/app.ts");
        assert!(plugin.load(&other.to_string_lossy()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_entry_file() {
        let (dir, plugin) = setup(|root| HostConfig::serve(root));
        fs::remove_file(dir.path().join("src/sw.ts")).unwrap();

        let err = plugin
            .load(&dir.path().join("src/sw.ts").to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err.source, Error::NotFound { .. }));
    }
}
