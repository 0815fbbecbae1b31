//! Plugin host seam.
//!
//! A Vite-shaped plugin interface with the hooks the worker components use,
//! plus a container that filters plugins by command, orders them by
//! `enforce`, and dispatches hooks in that order.
//!
//! ## Example
//!
//! ```ignore
//! use swpack_core::plugin::{Plugin, PluginContainer, HookResult, LoadResult};
//!
//! struct Banner;
//!
//! impl Plugin for Banner {
//!     fn name(&self) -> &str { "banner" }
//!
//!     fn load<'a>(&'a self, id: &'a str) -> BoxFuture<'a, HookResult<Option<LoadResult>>> {
//!         async move { Ok((id == "banner").then(|| LoadResult::code("export default 1"))) }.boxed()
//!     }
//! }
//! ```

use crate::config::Command;
use crate::error::Error;
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tracing::debug;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin hook.
#[derive(Debug, thiserror::Error)]
#[error("[{plugin}] {hook}: {source}")]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    #[source]
    pub source: Error,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, source: Error) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            source,
        }
    }
}

/// A chunk a plugin asked the host to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedChunk {
    /// Module id the chunk starts from.
    pub id: String,
    /// Output file name.
    pub file_name: String,
}

/// Context passed to `build_start`.
#[derive(Debug, Default)]
pub struct PluginContext {
    emitted: Vec<EmittedChunk>,
}

impl PluginContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the host to emit an entry chunk.
    pub fn emit_chunk(&mut self, id: impl Into<String>, file_name: impl Into<String>) {
        self.emitted.push(EmittedChunk {
            id: id.into(),
            file_name: file_name.into(),
        });
    }

    /// Chunks emitted so far, in emission order.
    pub fn emitted_chunks(&self) -> &[EmittedChunk] {
        &self.emitted
    }
}

/// One generated output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub file_name: String,
    pub code: String,
}

/// The final output of a build, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct OutputBundle {
    chunks: BTreeMap<String, OutputChunk>,
}

impl OutputBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a chunk.
    pub fn insert(&mut self, file_name: impl Into<String>, code: impl Into<String>) {
        let file_name = file_name.into();
        self.chunks.insert(
            file_name.clone(),
            OutputChunk {
                file_name,
                code: code.into(),
            },
        );
    }

    pub fn get(&self, file_name: &str) -> Option<&OutputChunk> {
        self.chunks.get(file_name)
    }

    pub fn get_mut(&mut self, file_name: &str) -> Option<&mut OutputChunk> {
        self.chunks.get_mut(file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.chunks.contains_key(file_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputChunk> {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (usually a file path).
    pub id: String,
}

impl ResolveIdResult {
    pub fn resolved(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of load hook.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
}

impl LoadResult {
    pub fn code(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Result of transform hook.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
}

impl TransformResult {
    pub fn code(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Plugin enforcement ordering. Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    Pre,
    #[default]
    Normal,
    Post,
}

/// Which host command a plugin takes part in. Mirrors Vite's `apply` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginApply {
    Build,
    Serve,
    #[default]
    Always,
}

impl PluginApply {
    #[must_use]
    pub fn matches(self, command: Command) -> bool {
        match self {
            Self::Always => true,
            Self::Build => command == Command::Build,
            Self::Serve => command == Command::Serve,
        }
    }
}

/// The plugin trait.
///
/// All hooks have no-op defaults; implement the ones you need. `load` and
/// `transform` are asynchronous because they read files.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Host commands this plugin runs under.
    fn apply(&self) -> PluginApply {
        PluginApply::Always
    }

    /// Called at the start of the build.
    fn build_start(&self, _ctx: &mut PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or the host resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by ID. `None` passes to the next plugin.
    fn load<'a>(&'a self, _id: &'a str) -> BoxFuture<'a, HookResult<Option<LoadResult>>> {
        future::ready(Ok(None)).boxed()
    }

    /// Transform module source code. `None` passes the code through unchanged.
    fn transform<'a>(
        &'a self,
        _code: &'a str,
        _id: &'a str,
    ) -> BoxFuture<'a, HookResult<Option<TransformResult>>> {
        future::ready(Ok(None)).boxed()
    }

    /// Post-process the final bundle.
    fn generate_bundle(&self, _bundle: &mut OutputBundle) -> HookResult<()> {
        Ok(())
    }
}

/// A container for the plugins active under one command.
///
/// Plugins are sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    command: Command,
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            plugins: Vec::new(),
            ctx: PluginContext::new(),
        }
    }

    /// Add a plugin. Plugins that do not apply to this command are dropped.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        if !plugin.apply().matches(self.command) {
            debug!(plugin = plugin.name(), command = ?self.command, "skipping plugin");
            return;
        }
        self.plugins.push(plugin);
        // Stable sort keeps insertion order within a level.
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Add every plugin of `plugins`.
    pub fn extend(&mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) {
        for plugin in plugins {
            self.add(plugin);
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Names of the active plugins, in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn has_plugins(&self) -> bool {
        !self.plugins.is_empty()
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Call `build_start` on all plugins.
    pub fn build_start(&mut self) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.build_start(&mut self.ctx)?;
        }
        Ok(())
    }

    /// First plugin resolution wins.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// First plugin load wins.
    pub async fn load(&self, id: &str) -> HookResult<Option<LoadResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.load(id).await? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transform code through all plugins; each output feeds the next plugin.
    pub async fn transform(&self, code: &str, id: &str) -> HookResult<String> {
        let mut current = code.to_string();
        for plugin in &self.plugins {
            if let Some(result) = plugin.transform(&current, id).await? {
                current = result.code;
            }
        }
        Ok(current)
    }

    /// Call `generate_bundle` on all plugins.
    pub fn generate_bundle(&self, bundle: &mut OutputBundle) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.generate_bundle(bundle)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for PluginContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContainer")
            .field("command", &self.command)
            .field("plugins", &self.names())
            .finish_non_exhaustive()
    }
}
