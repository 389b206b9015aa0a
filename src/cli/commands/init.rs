//! `pmvault init`: create the vault file if it does not exist.

use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, repository, Cli};
use crate::errors::Result;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let repo = repository(cli, &settings)?;

    // 1. Nothing to do if a vault is already there.
    if repo.exists() {
        output::info(&format!("Vault already exists at {}", repo.path().display()));
        output::tip("Run `pmvault list` to see its entries.");
        return Ok(());
    }

    // 2. Choose a master password and create the file.
    let password = prompt_new_password()?;
    repo.initialize_if_missing(&password)?;

    output::success(&format!("Vault created at {}", repo.path().display()));
    output::tip("Run `pmvault add --service <NAME> --username <USER>` to add an entry.");

    Ok(())
}
