use super::ProjectArgs;
use miette::{IntoDiagnostic, Result};
use swpack_core::Command;

/// Print the entry for `destination` as the build pipeline rewrites it.
pub async fn run(args: &ProjectArgs, destination: &str) -> Result<()> {
    let project = args.load()?;
    let entries = project.entries()?;
    let entry = entries
        .by_destination(destination)
        .ok_or_else(|| miette::miette!("no worker entry for destination `{destination}`"))?;

    let id = entry.source().to_string_lossy().into_owned();
    let source = tokio::fs::read_to_string(entry.source())
        .await
        .into_diagnostic()?;

    let container = project.plugins(Command::Build).await?;
    let code = container.transform(&source, &id).await.into_diagnostic()?;
    print!("{code}");
    Ok(())
}
