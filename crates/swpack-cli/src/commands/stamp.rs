use super::ProjectArgs;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;
use swpack_core::{Command, OutputBundle};
use swpack_util::fs::{read_text, replace_file};
use tracing::debug;

#[derive(Debug, Serialize)]
struct StampReport {
    outdir: String,
    stamped: Vec<String>,
}

/// Stamp every worker destination under `outdir` in place.
///
/// Only worker outputs are read and rewritten. A worker missing from the
/// directory, or one that is not valid UTF-8, fails the whole run before
/// anything is written.
pub async fn run(args: &ProjectArgs, outdir: &Path, json: bool) -> Result<()> {
    let project = args.load()?;
    let outdir = if outdir.is_absolute() {
        outdir.to_path_buf()
    } else {
        project.root.join(outdir)
    };
    let entries = project.entries()?;

    let mut bundle = OutputBundle::new();
    for entry in &entries {
        let path = outdir.join(entry.destination());
        if !path.is_file() {
            debug!(path = %path.display(), "worker output missing");
            continue;
        }
        bundle.insert(entry.destination(), read_text(&path).into_diagnostic()?);
    }

    let container = project.plugins(Command::Build).await?;
    container.generate_bundle(&mut bundle).into_diagnostic()?;

    let mut stamped = Vec::with_capacity(bundle.len());
    for chunk in bundle.iter() {
        replace_file(&outdir.join(&chunk.file_name), chunk.code.as_bytes()).into_diagnostic()?;
        stamped.push(chunk.file_name.clone());
    }

    if json {
        let report = StampReport {
            outdir: outdir.display().to_string(),
            stamped,
        };
        println!("{}", serde_json::to_string(&report).into_diagnostic()?);
    } else {
        for file in &stamped {
            println!("stamped {file}");
        }
    }
    Ok(())
}
