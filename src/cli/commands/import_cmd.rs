//! `pmvault import`: decrypt an exported entry and add it to the vault.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;
use crate::transfer::import_from_file;

/// Execute the `import` command.
pub fn execute(cli: &Cli, private_key: &Path, input: &Path) -> Result<()> {
    // 1. Decrypt first, so a bad envelope never prompts for the vault.
    let imported = import_from_file(private_key, input)?;

    // 2. Store it as a brand-new entry.
    let mut session = open_session(cli)?;
    let record = session.import_entry(&imported)?;

    output::success(&format!(
        "Imported '{}' for {} ({} total)",
        record.service,
        record.username,
        session.len()?
    ));
    output::info(&format!("Id: {}", record.id));

    Ok(())
}
