#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Isolated bundling of service worker entries.
//!
//! Worker entries get their own module graph: their imports are rewritten to
//! `sw-import:` virtual identifiers, loaded by [`loader::VirtualModuleLoader`],
//! and their output is stamped with a per-build version token. The host drives
//! everything through the [`plugin::Plugin`] components returned by
//! [`service_worker_plugins`].

pub mod config;
pub mod entry;
pub mod error;
pub mod imports;
pub mod loader;
pub mod plugin;
pub mod plugins;
pub mod reveal;
pub mod rewrite;
pub mod specifier;
pub mod version;
pub mod versions;
pub mod virtual_id;

pub use config::{Command, HostConfig, Mode, Options};
pub use entry::{Entry, EntryOptions, EntrySet};
pub use error::{BoxError, Error, Result};
pub use imports::{scan_imports, ImportParser, ImportScanner, ImportSpan};
pub use loader::VirtualModuleLoader;
pub use plugin::{OutputBundle, Plugin, PluginContainer, PluginError};
pub use plugins::{registration_types, service_worker_plugins, REGISTRATION_ID};
pub use specifier::{classify, SpecifierKind};
pub use versions::{compute_versions, VersionGenerator, VersionMap};
pub use virtual_id::VirtualId;
