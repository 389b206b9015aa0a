//! `pmvault genkeys`: write an RSA key pair for sharing entries.

use std::path::Path;

use crate::cli::output;
use crate::cli::load_settings;
use crate::errors::Result;
use crate::transfer::generate_key_files;

/// Execute the `genkeys` command.
pub fn execute(
    public_key: &Path,
    private_key: &Path,
    bits: Option<usize>,
    pem: bool,
) -> Result<()> {
    let settings = load_settings()?;
    let bits = bits.unwrap_or(settings.rsa_bits);

    output::info(&format!("Generating {bits}-bit RSA key pair..."));
    generate_key_files(public_key, private_key, bits, pem)?;

    output::success(&format!("Public key written to {}", public_key.display()));
    output::success(&format!("Private key written to {}", private_key.display()));
    output::warning("Keep the private key secret! Anyone with it can read entries exported to you.");
    output::tip("Share the public key with whoever will export entries to you.");

    Ok(())
}
