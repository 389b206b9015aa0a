//! RSA key pairs for wrapping one-time record keys.
//!
//! Public keys travel as SubjectPublicKeyInfo DER, private keys as PKCS#8
//! DER.  Encryption is RSA-OAEP with SHA-256; signatures are
//! RSASSA-PKCS1-v1_5 over SHA-256.  RSA only ever wraps short symmetric
//! keys here, never vault contents.

use aes_gcm::aead::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::{PmVaultError, Result};

/// Default modulus size for new key pairs.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus accepted for new key pairs.
pub const MIN_KEY_BITS: usize = 2048;

/// Largest modulus accepted for new key pairs.
pub const MAX_KEY_BITS: usize = 8192;

/// SHA-256 output length, used to size the OAEP overhead.
const OAEP_HASH_LEN: usize = 32;

/// A freshly generated key pair in binary (DER) form.
pub struct KeyPair {
    /// SubjectPublicKeyInfo DER.
    pub public_der: Vec<u8>,
    /// PKCS#8 DER, zeroized on drop.
    pub private_der: Zeroizing<Vec<u8>>,
}

/// Generate a new RSA key pair with a `bits`-bit modulus.
pub fn generate_key_pair(bits: usize) -> Result<KeyPair> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
        return Err(PmVaultError::InvalidInput(format!(
            "RSA key size must be between {MIN_KEY_BITS} and {MAX_KEY_BITS} bits (got {bits})"
        )));
    }

    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| PmVaultError::InvalidInput(format!("RSA key generation failed: {e}")))?;
    let public = RsaPublicKey::from(&private);

    let private_doc = private
        .to_pkcs8_der()
        .map_err(|e| PmVaultError::SerializationError(format!("private key: {e}")))?;
    let public_doc = public
        .to_public_key_der()
        .map_err(|e| PmVaultError::SerializationError(format!("public key: {e}")))?;

    Ok(KeyPair {
        public_der: public_doc.as_bytes().to_vec(),
        private_der: Zeroizing::new(private_doc.as_bytes().to_vec()),
    })
}

/// Encrypt `data` for the holder of the private key matching `public_der`.
pub fn encrypt_with_public_key(public_der: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let public = parse_public_key(public_der)?;

    let capacity = public.size().saturating_sub(2 * OAEP_HASH_LEN + 2);
    if data.len() > capacity {
        return Err(PmVaultError::InvalidInput(format!(
            "RSA-OAEP can wrap at most {capacity} bytes with this key (got {})",
            data.len()
        )));
    }

    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
        .map_err(|e| PmVaultError::InvalidInput(format!("RSA encryption failed: {e}")))
}

/// Decrypt a ciphertext produced by `encrypt_with_public_key`.
///
/// A ciphertext made for a different key fails with
/// `AuthenticationFailure`.
pub fn decrypt_with_private_key(private_der: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let private = parse_private_key(private_der)?;

    private
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| PmVaultError::AuthenticationFailure)
}

/// Sign `data` with RSASSA-PKCS1-v1_5 / SHA-256.
pub fn sign(private_der: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let private = parse_private_key(private_der)?;
    let digest = Sha256::digest(data);

    private
        .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(|e| PmVaultError::InvalidInput(format!("RSA signing failed: {e}")))
}

/// Check a signature produced by `sign`.
pub fn verify(public_der: &[u8], data: &[u8], signature: &[u8]) -> Result<bool> {
    let public = parse_public_key(public_der)?;
    let digest = Sha256::digest(data);

    Ok(public
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .is_ok())
}

fn parse_public_key(der: &[u8]) -> Result<RsaPublicKey> {
    RsaPublicKey::from_public_key_der(der)
        .map_err(|e| PmVaultError::InvalidInput(format!("not an RSA public key: {e}")))
}

fn parse_private_key(der: &[u8]) -> Result<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs8_der(der)
        .map_err(|e| PmVaultError::InvalidInput(format!("not an RSA private key: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_key_sizes() {
        assert!(matches!(
            generate_key_pair(1024),
            Err(PmVaultError::InvalidInput(_))
        ));
        assert!(generate_key_pair(MAX_KEY_BITS + 1).is_err());
    }

    #[test]
    fn garbage_der_is_invalid_input() {
        assert!(matches!(
            encrypt_with_public_key(b"not der", b"x"),
            Err(PmVaultError::InvalidInput(_))
        ));
        assert!(matches!(
            decrypt_with_private_key(b"not der", b"x"),
            Err(PmVaultError::InvalidInput(_))
        ));
    }

    #[test]
    fn oaep_capacity_is_enforced() {
        let pair = generate_key_pair(DEFAULT_KEY_BITS).unwrap();
        // 256-byte modulus - 66 bytes of OAEP overhead.
        assert!(encrypt_with_public_key(&pair.public_der, &[0u8; 190]).is_ok());
        assert!(matches!(
            encrypt_with_public_key(&pair.public_der, &[0u8; 191]),
            Err(PmVaultError::InvalidInput(_))
        ));
    }
}
