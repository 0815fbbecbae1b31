use super::ProjectArgs;
use miette::{IntoDiagnostic, Result};
use swpack_core::{registration_types, Command, Mode, REGISTRATION_ID};

/// Print the registration module.
///
/// Production mode computes real tokens (running the generators); any other
/// mode reports `dev` and runs nothing.
pub async fn run(args: &ProjectArgs) -> Result<()> {
    let project = args.load()?;
    let command = match args.mode.unwrap_or(Mode::Production) {
        Mode::Production => Command::Build,
        Mode::Development => Command::Serve,
    };
    let container = project.plugins(command).await?;

    let module = container
        .load(REGISTRATION_ID)
        .await
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("registration module unavailable"))?;
    print!("{}", module.code);
    Ok(())
}

/// Print the TypeScript declaration of the registration module.
pub fn types() -> Result<()> {
    print!("{}", registration_types());
    Ok(())
}
