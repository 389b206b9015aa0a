//! PEM armor around binary key encodings.
//!
//! ```text
//! -----BEGIN <LABEL>-----
//! <base64, 64 characters per line>
//! -----END <LABEL>-----
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::errors::{PmVaultError, Result};

/// Label for SubjectPublicKeyInfo public keys.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Label for PKCS#8 private keys.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

const LINE_WIDTH: usize = 64;

/// Wrap `der` in PEM armor with the given label.
pub fn encode(der: &[u8], label: &str) -> Zeroizing<String> {
    let b64 = Zeroizing::new(BASE64.encode(der));
    let mut out = Zeroizing::new(String::with_capacity(
        b64.len() + b64.len() / LINE_WIDTH + 2 * label.len() + 40,
    ));

    out.push_str(&format!("-----BEGIN {label}-----\n"));
    // Base64 output is pure ASCII, so splitting on byte offsets is safe.
    for line in b64.as_bytes().chunks(LINE_WIDTH) {
        out.extend(line.iter().map(|&b| char::from(b)));
        out.push('\n');
    }
    out.push_str(&format!("-----END {label}-----\n"));
    out
}

/// Strip the armor from `text` and return the binary encoding.
///
/// Both delimiters must be present with the expected label, in order.
/// All whitespace between them is ignored.
pub fn decode(text: &str, label: &str) -> Result<Zeroizing<Vec<u8>>> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");

    let start = text
        .find(&begin)
        .ok_or_else(|| PmVaultError::InvalidInput(format!("missing `{begin}` line")))?
        + begin.len();
    let stop = text[start..]
        .find(&end)
        .ok_or_else(|| PmVaultError::InvalidInput(format!("missing `{end}` line")))?
        + start;

    let body: Zeroizing<String> = Zeroizing::new(
        text[start..stop]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    );
    if body.is_empty() {
        return Err(PmVaultError::InvalidInput("PEM body is empty".into()));
    }

    BASE64
        .decode(body.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| PmVaultError::InvalidInput(format!("PEM body is not valid base64: {e}")))
}

/// Read the label out of the first `-----BEGIN <LABEL>-----` line.
pub fn detect_label(text: &str) -> Option<&str> {
    let rest = &text[text.find("-----BEGIN ")? + "-----BEGIN ".len()..];
    let label = &rest[..rest.find("-----")?];
    (!label.is_empty() && !label.contains('\n')).then_some(label)
}
