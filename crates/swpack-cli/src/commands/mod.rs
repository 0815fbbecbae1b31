pub mod load;
pub mod register;
pub mod rewrite;
pub mod serve;
pub mod stamp;
pub mod version;
pub mod versions;

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use swpack_core::config::{load_config, SwpackConfig};
use swpack_core::plugin::PluginContainer;
use swpack_core::{service_worker_plugins, Command, EntrySet, HostConfig, Mode, Options};

/// Project selection shared by every command that reads the config file.
#[derive(Debug, Clone)]
pub struct ProjectArgs {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub mode: Option<Mode>,
}

/// A loaded project: its root and its config file.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub config: SwpackConfig,
    mode: Option<Mode>,
}

impl ProjectArgs {
    pub fn load(&self) -> Result<Project> {
        let root = self.root.canonicalize().into_diagnostic()?;
        let Some((path, config)) = load_config(&root, self.config.as_deref()).into_diagnostic()?
        else {
            return Err(miette::miette!(
                "no swpack.json found in {}",
                root.display()
            ));
        };
        tracing::debug!(config = %path.display(), entries = config.entries.len(), "loaded config");
        Ok(Project {
            root,
            config,
            mode: self.mode,
        })
    }
}

impl Project {
    /// Host configuration for `command`; the mode follows the command unless overridden.
    pub fn host(&self, command: Command) -> HostConfig {
        let mode = self.mode.unwrap_or(match command {
            Command::Build => Mode::Production,
            Command::Serve => Mode::Development,
        });
        self.config.host(&self.root, command, mode)
    }

    pub fn options(&self) -> Options {
        self.config.options(&self.root)
    }

    /// Validated entries, without running any version generator.
    pub fn entries(&self) -> Result<EntrySet> {
        EntrySet::new(&self.root, self.options().entries).into_diagnostic()
    }

    /// The worker plugins active under `command`.
    pub async fn plugins(&self, command: Command) -> Result<PluginContainer> {
        let host = self.host(command);
        let plugins = service_worker_plugins(self.options(), &host)
            .await
            .into_diagnostic()?;
        let mut container = PluginContainer::new(command);
        container.extend(plugins);
        Ok(container)
    }
}
