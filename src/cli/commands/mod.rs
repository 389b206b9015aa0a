//! One module per subcommand; each exposes `execute`.

pub mod add;
pub mod export;
pub mod genkeys;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod remove;
