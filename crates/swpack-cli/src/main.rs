#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use swpack_core::Mode;
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "swpack")]
#[command(author, version, about = "Isolated service worker bundling", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory (the project root)
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// Config file (default: swpack.json in the project root)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Build mode: production or development
    #[arg(long, global = true)]
    mode: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Compute the version token of every worker
    Versions,

    /// Print a worker entry with its imports rewritten
    Rewrite {
        /// Destination of the entry, e.g. `sw.js`
        destination: String,
    },

    /// Print the module text behind a virtual identifier
    Load {
        /// `sw-import:<index>,<specifier>` or `virtual:sw-plugin`
        id: String,
    },

    /// Print the `virtual:sw-plugin` registration module
    Register {
        /// Print the TypeScript declaration instead
        #[arg(long)]
        types: bool,
    },

    /// Stamp version tokens into a bundled output directory
    Stamp {
        /// Directory holding the bundled workers
        outdir: PathBuf,
    },

    /// Serve workers in development mode
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 5173)]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mode = cli
        .mode
        .as_deref()
        .map(str::parse::<Mode>)
        .transpose()
        .map_err(|e| miette::miette!("{e}"))?;

    let json = cli.json;
    logging::init(cli.verbose, json);

    let project = commands::ProjectArgs {
        root: cwd,
        config: cli.config,
        mode,
    };

    let command = match cli.command {
        Some(Commands::Version) | None => return commands::version::run(),
        Some(Commands::Register { types: true }) => return commands::register::types(),
        Some(command) => command,
    };

    let rt = tokio::runtime::Runtime::new().into_diagnostic()?;
    rt.block_on(async move {
        match command {
            Commands::Versions => commands::versions::run(&project, json).await,
            Commands::Rewrite { destination } => {
                commands::rewrite::run(&project, &destination).await
            }
            Commands::Load { id } => commands::load::run(&project, &id).await,
            Commands::Register { .. } => commands::register::run(&project).await,
            Commands::Stamp { outdir } => commands::stamp::run(&project, &outdir, json).await,
            Commands::Serve { port, host } => {
                let span = tracing::info_span!("serve", cmd = "serve", cwd = %project.root.display());
                commands::serve::run(&project, &host, port)
                    .instrument(span)
                    .await
            }
            Commands::Version => unreachable!(), // Handled above
        }
    })
}
