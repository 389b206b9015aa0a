//! Cryptographic primitives for PmVault.
//!
//! This module provides:
//! - AES-GCM encryption and decryption (`encryption`)
//! - PBKDF2 password-based key derivation (`kdf`)
//! - The zeroizing cipher key and password verifier (`keys`)
//! - RSA key pairs, OAEP wrapping and signatures (`rsa_keys`)
//! - PEM armor for key files (`pem`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod pem;
pub mod random;
pub mod rsa_keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt};
pub use kdf::{
    compute_verifier, derive_cipher_key, derive_key, generate_salt, verifier_matches, KdfParams,
};
pub use keys::CipherKey;
pub use rsa_keys::{
    decrypt_with_private_key, encrypt_with_public_key, generate_key_pair, sign, verify, KeyPair,
};
