//! `pmvault remove`: delete a credential from the vault.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{PmVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let mut session = open_session(cli)?;

    if !session.remove_entry(id)? {
        output::tip("Run `pmvault list` to see entry ids.");
        return Err(PmVaultError::EntryNotFound(id.to_string()));
    }

    output::success(&format!("Removed entry '{id}'"));
    Ok(())
}
