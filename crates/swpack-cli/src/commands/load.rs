use super::ProjectArgs;
use miette::{IntoDiagnostic, Result};
use swpack_core::Command;

/// Print the module text the build pipeline loads for `id`.
pub async fn run(args: &ProjectArgs, id: &str) -> Result<()> {
    let project = args.load()?;
    let container = project.plugins(Command::Build).await?;

    let resolved = container
        .resolve_id(id, None)
        .into_diagnostic()?
        .map_or_else(|| id.to_string(), |r| r.id);
    let loaded = container
        .load(&resolved)
        .await
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("no worker module answers `{id}`"))?;

    print!("{}", loaded.code);
    Ok(())
}
