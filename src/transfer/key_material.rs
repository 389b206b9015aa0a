//! Key files in either binary (DER) or PEM-armored form.
//!
//! The form is detected once, when the file is read, by looking for a
//! `BEGIN` marker near the start.  Everything downstream works on the
//! binary encoding.

use std::fs;
use std::path::Path;

use zeroize::Zeroizing;

use crate::crypto::pem::{self, PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
use crate::errors::{PmVaultError, Result};

/// How far into a key file to look for a PEM `BEGIN` marker.
const PEM_SNIFF_LEN: usize = 64;

/// Key bytes as they were found on disk.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Raw DER.
    Binary(Zeroizing<Vec<u8>>),
    /// DER recovered from PEM armor with the given label.
    PemArmored {
        label: String,
        der: Zeroizing<Vec<u8>>,
    },
}

impl KeyMaterial {
    /// Classify and decode key bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        if !looks_like_pem(raw) {
            return Ok(Self::Binary(Zeroizing::new(raw.to_vec())));
        }

        let text = std::str::from_utf8(raw)
            .map_err(|_| PmVaultError::InvalidInput("PEM key file is not valid UTF-8".into()))?;
        let label = pem::detect_label(text)
            .ok_or_else(|| PmVaultError::InvalidInput("malformed PEM BEGIN line".into()))?
            .to_string();
        let der = pem::decode(text, &label)?;

        Ok(Self::PemArmored { label, der })
    }

    /// Read and classify a key file.
    pub fn read(path: &Path) -> Result<Self> {
        let raw = Zeroizing::new(fs::read(path)?);
        Self::from_bytes(&raw)
    }

    /// The binary encoding, whatever form the key arrived in.
    pub fn der(&self) -> &[u8] {
        match self {
            Self::Binary(der) | Self::PemArmored { der, .. } => der,
        }
    }

    pub fn is_pem(&self) -> bool {
        matches!(self, Self::PemArmored { .. })
    }

    /// DER of a public key; rejects PEM armor labelled as something else.
    pub fn public_key_der(&self) -> Result<&[u8]> {
        self.der_with_label(PUBLIC_KEY_LABEL)
    }

    /// DER of a private key; rejects PEM armor labelled as something else.
    pub fn private_key_der(&self) -> Result<&[u8]> {
        self.der_with_label(PRIVATE_KEY_LABEL)
    }

    fn der_with_label(&self, expected: &str) -> Result<&[u8]> {
        match self {
            Self::PemArmored { label, .. } if label != expected => {
                Err(PmVaultError::InvalidInput(format!(
                    "expected a PEM `{expected}`, found `{label}`"
                )))
            }
            _ => Ok(self.der()),
        }
    }
}

fn looks_like_pem(raw: &[u8]) -> bool {
    raw[..raw.len().min(PEM_SNIFF_LEN)]
        .windows(5)
        .any(|w| w == b"BEGIN")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_bytes_stay_binary() {
        let der = [0x30u8, 0x82, 0x01, 0x22, 0x30, 0x0d];
        let material = KeyMaterial::from_bytes(&der).unwrap();
        assert!(!material.is_pem());
        assert_eq!(material.der(), &der);
    }

    #[test]
    fn pem_is_detected_and_decoded() {
        let der = b"pretend this is DER".to_vec();
        let armored = pem::encode(&der, PUBLIC_KEY_LABEL);

        let material = KeyMaterial::from_bytes(armored.as_bytes()).unwrap();
        assert!(material.is_pem());
        assert_eq!(material.public_key_der().unwrap(), &der[..]);
    }

    #[test]
    fn wrong_pem_label_is_rejected() {
        let armored = pem::encode(b"key", PRIVATE_KEY_LABEL);
        let material = KeyMaterial::from_bytes(armored.as_bytes()).unwrap();
        assert!(material.private_key_der().is_ok());
        assert!(matches!(
            material.public_key_der(),
            Err(PmVaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn broken_armor_is_invalid_input() {
        let broken = b"-----BEGIN PUBLIC KEY-----\nAAAA\n";
        assert!(matches!(
            KeyMaterial::from_bytes(broken),
            Err(PmVaultError::InvalidInput(_))
        ));
    }
}
