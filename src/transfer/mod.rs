//! Sharing single records between vaults with RSA key pairs.

pub mod envelope;
pub mod key_material;

pub use envelope::{export_record, export_to_file, generate_key_files, import_from_file, import_record};
pub use key_material::KeyMaterial;
