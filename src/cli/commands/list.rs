//! `pmvault list`: display all credentials in a table.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show_passwords: bool) -> Result<()> {
    let session = open_session(cli)?;
    let records = session.entries()?;

    output::info(&format!(
        "{} entr{} in {}",
        records.len(),
        if records.len() == 1 { "y" } else { "ies" },
        session.path().display()
    ));

    output::print_records_table(records, show_passwords);

    Ok(())
}
