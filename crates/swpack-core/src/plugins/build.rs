//! Production build plugin.
//!
//! Emits one chunk per worker entry, rewrites the imports of entry sources
//! into virtual identifiers, answers loads of those identifiers, and stamps
//! each worker's version token into the final bundle.

use crate::config::HostConfig;
use crate::entry::EntrySet;
use crate::error::Error;
use crate::imports::{ImportParser, ImportScanner};
use crate::loader::VirtualModuleLoader;
use crate::plugin::{
    HookResult, LoadResult, OutputBundle, Plugin, PluginApply, PluginContext, PluginEnforce,
    PluginError, TransformResult,
};
use crate::rewrite::rewrite_imports;
use crate::versions::{stamp_placeholder, VersionMap};
use crate::virtual_id::VirtualId;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::info;

pub const NAME: &str = "sw-plugin";

/// Build-command half of the worker pipeline.
pub struct BuildPlugin {
    entries: Arc<EntrySet>,
    versions: Arc<VersionMap>,
    loader: VirtualModuleLoader,
    parser: Arc<dyn ImportParser>,
}

impl BuildPlugin {
    /// `versions` must hold a token for every entry.
    pub fn new(host: &HostConfig, entries: Arc<EntrySet>, versions: Arc<VersionMap>) -> Self {
        Self {
            loader: VirtualModuleLoader::new(&host.root, Arc::clone(&entries)),
            entries,
            versions,
            parser: Arc::new(ImportScanner),
        }
    }

    /// Use a different import parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn ImportParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn versions(&self) -> &VersionMap {
        &self.versions
    }

    fn error(hook: &'static str, source: Error) -> PluginError {
        PluginError::new(NAME, hook, source)
    }
}

impl Plugin for BuildPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Post
    }

    fn apply(&self) -> PluginApply {
        PluginApply::Build
    }

    fn build_start(&self, ctx: &mut PluginContext) -> HookResult<()> {
        for entry in self.entries.iter() {
            info!(
                source = %entry.source().display(),
                destination = entry.destination(),
                "emitting worker chunk"
            );
            ctx.emit_chunk(entry.source().to_string_lossy(), entry.destination());
        }
        Ok(())
    }

    fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HookResult<Option<LoadResult>>> {
        async move {
            if !VirtualId::is_virtual(id) {
                return Ok(None);
            }
            let code = self
                .loader
                .load(id)
                .await
                .map_err(|e| Self::error("load", e))?;
            Ok(Some(LoadResult::code(code)))
        }
        .boxed()
    }

    fn transform<'a>(
        &'a self,
        code: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, HookResult<Option<TransformResult>>> {
        async move {
            let Some(entry) = self.entries.by_source(id) else {
                return Ok(None);
            };
            let imports = self
                .parser
                .parse_imports(entry.source(), code)
                .map_err(|e| Self::error("transform", e))?;
            let rewritten = rewrite_imports(entry.index(), entry.source(), code, &imports)
                .await
                .map_err(|e| Self::error("transform", e))?;
            Ok(Some(TransformResult::code(rewritten)))
        }
        .boxed()
    }

    fn generate_bundle(&self, bundle: &mut OutputBundle) -> HookResult<()> {
        for entry in self.entries.iter() {
            let destination = entry.destination();
            let chunk = bundle.get_mut(destination).ok_or_else(|| {
                Self::error(
                    "generate_bundle",
                    Error::DestinationNotInOutput {
                        destination: destination.to_string(),
                    },
                )
            })?;
            let token = self.versions.get(destination).ok_or_else(|| {
                Self::error(
                    "generate_bundle",
                    Error::MissingVersion {
                        destination: destination.to_string(),
                    },
                )
            })?;
            chunk.code = stamp_placeholder(&chunk.code, token);
            info!(destination, version = token, "stamped worker version");
        }
        Ok(())
    }
}
