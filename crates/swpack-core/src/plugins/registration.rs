//! The `virtual:sw-plugin` registration module.
//!
//! Application code imports it to learn which workers exist and to register
//! them:
//!
//! ```js
//! import {packedSW, registerSW} from 'virtual:sw-plugin'
//!
//! for (const {dist, version} of packedSW()) registerSW(dist)
//! ```

use crate::config::HostConfig;
use crate::entry::EntrySet;
use crate::plugin::{HookResult, LoadResult, Plugin, ResolveIdResult};
use crate::versions::{VersionMap, DEV_VERSION};
use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;

pub const NAME: &str = "sw-plugin:virtual";

/// Module id application code imports.
pub const REGISTRATION_ID: &str = "virtual:sw-plugin";

/// One worker as exposed by `packedSW()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedWorker {
    pub dist: String,
    pub version: String,
}

/// Serves the registration module under both commands.
#[derive(Debug, Clone)]
pub struct RegistrationPlugin {
    workers: Vec<PackedWorker>,
    script_type: &'static str,
}

impl RegistrationPlugin {
    /// Records are produced in entry declaration order. Production mode
    /// exposes the computed tokens; every other mode reports `dev`.
    pub fn new(host: &HostConfig, entries: &EntrySet, versions: &VersionMap) -> Self {
        let production = host.mode.is_production();
        let workers = entries
            .iter()
            .map(|entry| {
                let version = if production {
                    versions.get(entry.destination()).unwrap_or(DEV_VERSION)
                } else {
                    DEV_VERSION
                };
                PackedWorker {
                    dist: entry.destination().to_string(),
                    version: version.to_string(),
                }
            })
            .collect();

        Self {
            workers,
            script_type: if production { "classic" } else { "module" },
        }
    }

    pub fn workers(&self) -> &[PackedWorker] {
        &self.workers
    }

    /// Text of the registration module.
    pub fn module_source(&self) -> String {
        let packed = serde_json::to_string(&self.workers).unwrap_or_else(|_| "[]".to_string());
        format!(
            "export const packedSW = () => ({packed})\n\
             export const registerSW = (dist, options) => ('serviceWorker' in navigator &&\n\
             \tnavigator.serviceWorker.register('/' + dist, {{type: '{}', ...options}}))\n",
            self.script_type
        )
    }
}

impl Plugin for RegistrationPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok((specifier == REGISTRATION_ID).then(|| ResolveIdResult::resolved(REGISTRATION_ID)))
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HookResult<Option<LoadResult>>> {
        let result = (id == REGISTRATION_ID).then(|| LoadResult::code(self.module_source()));
        future::ready(Ok(result)).boxed()
    }
}

/// TypeScript declaration for the registration module.
#[must_use]
pub fn registration_types() -> &'static str {
    "declare module 'virtual:sw-plugin' {\n\
     \texport function packedSW(): { dist: string, version: string }[]\n\
     \n\
     \texport function registerSW(dist: string, options?: RegistrationOptions): Promise<ServiceWorkerRegistration>\n\
     }\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::entry::EntryOptions;
    use std::path::Path;

    fn entries() -> EntrySet {
        EntrySet::new(
            Path::new("/project"),
            vec![
                EntryOptions::new("src/sw.ts", "/sw.js"),
                EntryOptions::new("src/push.ts", "push.js"),
            ],
        )
        .unwrap()
    }

    fn versions() -> VersionMap {
        [
            ("sw.js".to_string(), "1a2b3c4d".to_string()),
            ("push.js".to_string(), "deadbeef".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_production_records() {
        let plugin = RegistrationPlugin::new(&HostConfig::build("/project"), &entries(), &versions());
        assert_eq!(
            plugin.workers(),
            &[
                PackedWorker {
                    dist: "sw.js".to_string(),
                    version: "1a2b3c4d".to_string()
                },
                PackedWorker {
                    dist: "push.js".to_string(),
                    version: "deadbeef".to_string()
                },
            ]
        );

        let source = plugin.module_source();
        assert!(source.contains(
            r#"packedSW = () => ([{"dist":"sw.js","version":"1a2b3c4d"},{"dist":"push.js","version":"deadbeef"}])"#
        ));
        assert!(source.contains("type: 'classic'"));
        assert!(source.contains("'serviceWorker' in navigator &&"));
        assert!(source.contains("register('/' + dist"));
    }

    #[test]
    fn test_development_records() {
        let host = HostConfig::serve("/project");
        let plugin = RegistrationPlugin::new(&host, &entries(), &VersionMap::default());

        assert!(plugin.workers().iter().all(|w| w.version == "dev"));
        assert!(plugin.module_source().contains("type: 'module'"));
    }

    #[test]
    fn test_development_mode_build_reports_dev() {
        let host = HostConfig::build("/project").with_mode(Mode::Development);
        let plugin = RegistrationPlugin::new(&host, &entries(), &versions());
        assert!(plugin.workers().iter().all(|w| w.version == "dev"));
    }

    #[tokio::test]
    async fn test_resolve_and_load() {
        let plugin = RegistrationPlugin::new(&HostConfig::build("/project"), &entries(), &versions());

        let resolved = plugin.resolve_id(REGISTRATION_ID, None).unwrap().unwrap();
        assert_eq!(resolved.id, REGISTRATION_ID);
        assert!(plugin.resolve_id("virtual:other", None).unwrap().is_none());

        let loaded = plugin.load(REGISTRATION_ID).await.unwrap().unwrap();
        assert_eq!(loaded.code, plugin.module_source());
        assert!(plugin.load("/src/main.ts").await.unwrap().is_none());
    }

    #[test]
    fn test_module_exports_exactly_two_bindings() {
        let plugin = RegistrationPlugin::new(&HostConfig::build("/project"), &entries(), &versions());
        let source = plugin.module_source();
        assert_eq!(source.matches("export ").count(), 2);
    }

    #[test]
    fn test_types_declare_both_bindings() {
        let types = registration_types();
        assert!(types.starts_with("declare module 'virtual:sw-plugin'"));
        assert!(types.contains("packedSW(): { dist: string, version: string }[]"));
        assert!(types.contains("registerSW(dist: string"));
    }
}
