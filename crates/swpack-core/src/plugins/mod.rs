//! The worker plugins a host composes.
//!
//! | plugin              | command | enforce | role                                  |
//! |---------------------|---------|---------|---------------------------------------|
//! | `sw-plugin`         | build   | post    | emit, rewrite, load, stamp            |
//! | `sw-plugin:dev`     | serve   | pre     | serve entries verbatim                |
//! | `sw-plugin:virtual` | both    | normal  | `virtual:sw-plugin` registration code |

pub mod build;
pub mod dev;
pub mod registration;

pub use build::BuildPlugin;
pub use dev::DevPlugin;
pub use registration::{registration_types, PackedWorker, RegistrationPlugin, REGISTRATION_ID};

use crate::config::{Command, HostConfig, Options};
use crate::entry::EntrySet;
use crate::error::Result;
use crate::plugin::Plugin;
use crate::versions::{compute_versions, VersionMap};
use std::sync::Arc;
use tracing::info;

/// Validate `options` and build the three worker plugins.
///
/// Entries are validated before anything touches the filesystem. Under the
/// build command every version generator runs, concurrently, before this
/// returns; the serve command never runs them.
pub async fn service_worker_plugins(
    options: Options,
    host: &HostConfig,
) -> Result<Vec<Box<dyn Plugin>>> {
    let entries = Arc::new(EntrySet::new(&host.root, options.entries)?);

    let versions = match host.command {
        Command::Build => compute_versions(&entries).await?,
        Command::Serve => VersionMap::default(),
    };
    info!(
        entries = entries.len(),
        command = ?host.command,
        mode = host.mode.as_str(),
        "configured worker entries"
    );
    let versions = Arc::new(versions);

    let plugins: Vec<Box<dyn Plugin>> = vec![
        Box::new(BuildPlugin::new(host, Arc::clone(&entries), Arc::clone(&versions))),
        Box::new(DevPlugin::new(host, Arc::clone(&entries))),
        Box::new(RegistrationPlugin::new(host, &entries, &versions)),
    ];
    Ok(plugins)
}
