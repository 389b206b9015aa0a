//! `pmvault export`: encrypt one entry for a recipient's public key.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{PmVaultError, Result};
use crate::transfer::export_to_file;

/// Execute the `export` command.
pub fn execute(cli: &Cli, id: &str, public_key: &Path, output_path: &Path) -> Result<()> {
    let session = open_session(cli)?;

    // Safety: refuse to overwrite the vault itself.
    if std::env::current_dir()?.join(output_path) == session.path() {
        return Err(PmVaultError::CommandFailed(
            "refusing to export over the vault file".into(),
        ));
    }

    let record = session
        .find(id)?
        .ok_or_else(|| PmVaultError::EntryNotFound(id.to_string()))?;

    export_to_file(record, public_key, output_path)?;

    output::success(&format!(
        "Exported '{}' to {}",
        record.service,
        output_path.display()
    ));
    output::tip("Only the holder of the matching private key can import it.");

    Ok(())
}
