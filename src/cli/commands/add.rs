//! `pmvault add`: store a new credential.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{PmVaultError, Result};
use crate::vault::NewEntry;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    service: &str,
    username: &str,
    password: Option<&str>,
    notes: Option<&str>,
) -> Result<()> {
    if service.trim().is_empty() {
        return Err(PmVaultError::InvalidInput("service must not be empty".into()));
    }
    if username.trim().is_empty() {
        return Err(PmVaultError::InvalidInput("username must not be empty".into()));
    }

    let secret = read_entry_password(service, password)?;

    let mut session = open_session(cli)?;
    let entry = NewEntry::new(
        service,
        username,
        secret.as_str(),
        notes.filter(|n| !n.is_empty()).map(str::to_string),
    );
    let record = session.add_entry(&entry)?;

    output::success(&format!(
        "Added '{}' for {} ({} total)",
        record.service,
        record.username,
        session.len()?
    ));
    output::info(&format!("Id: {}", record.id));

    Ok(())
}

/// The entry password from one of three sources.
fn read_entry_password(service: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        // Source 1: Inline value on the command line.
        output::warning("Password provided on command line; it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        // Source 2: Piped input.
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    // Source 3: Interactive secure prompt.
    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {service}"))
        .interact()
        .map_err(|e| PmVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
