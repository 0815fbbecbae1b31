use super::ProjectArgs;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use swpack_core::compute_versions;

/// Run every version generator and print the token of each destination.
pub async fn run(args: &ProjectArgs, json: bool) -> Result<()> {
    let project = args.load()?;
    let entries = project.entries()?;
    let versions = compute_versions(&entries).await.into_diagnostic()?;

    if json {
        let records: Vec<_> = versions
            .ordered(&entries)
            .map(|(dist, version)| json!({ "dist": dist, "version": version }))
            .collect();
        println!("{}", json!({ "versions": records }));
    } else {
        for (dist, version) in versions.ordered(&entries) {
            println!("{dist}\t{version}");
        }
    }
    Ok(())
}
