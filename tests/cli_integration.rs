//! Integration tests for the PmVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The master password comes from `PM_PASSWORD` and each test runs in its
//! own temp directory with a `pmconfig.toml` that keeps PBKDF2 fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "correct-horse";

/// Helper: get a Command pointing at the pmvault binary.
fn pmvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pmvault").expect("binary should exist");
    cmd.env_remove("PM_VAULT").env_remove("RUST_LOG");
    cmd
}

/// Helper: a temp working directory with a fast-KDF config file.
fn workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("pmconfig.toml")
        .write_str("kdf_iterations = 1000\n")
        .unwrap();
    tmp
}

/// Helper: run `pmvault` in `dir` with the master password set.
fn run(dir: &TempDir, password: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    pmvault()
        .current_dir(dir.path())
        .env("PM_PASSWORD", password)
        .args(args)
        .assert()
}

/// Helper: the entry id printed by `add` or `import`.
fn printed_id(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .find(|l| l.contains("Id: "))
        .expect("output should contain an id");
    line.split("Id: ").nth(1).unwrap().trim().to_string()
}

// ---------------------------------------------------------------------------
// Help and usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    pmvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted password vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("genkeys"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn version_flag_shows_version() {
    pmvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmvault"));
}

#[test]
fn no_args_shows_help() {
    pmvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn add_without_username_fails() {
    pmvault()
        .args(["add", "--service", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

// ---------------------------------------------------------------------------
// Vault lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_once() {
    let tmp = workspace();

    run(&tmp, PASSWORD, &["init"])
        .success()
        .stdout(predicate::str::contains("Vault created"));
    tmp.child(".vault").assert(predicate::path::exists());

    run(&tmp, PASSWORD, &["init"])
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn add_then_list_masks_passwords() {
    let tmp = workspace();

    run(
        &tmp,
        PASSWORD,
        &[
            "add",
            "--service",
            "example.com",
            "--username",
            "alice",
            "--password",
            "s3cr3t",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Added 'example.com'"));

    run(&tmp, PASSWORD, &["list"])
        .success()
        .stdout(predicate::str::contains("example.com"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("s3cr3t").not());

    run(&tmp, PASSWORD, &["list", "--show-passwords"])
        .success()
        .stdout(predicate::str::contains("s3cr3t"));
}

#[test]
fn wrong_password_is_rejected() {
    let tmp = workspace();
    run(&tmp, PASSWORD, &["init"]).success();

    run(&tmp, "battery-staple", &["list"])
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn corrupt_vault_is_reported() {
    let tmp = workspace();
    tmp.child(".vault").write_binary(b"PMV1").unwrap();

    run(&tmp, PASSWORD, &["list"])
        .failure()
        .stderr(predicate::str::contains("Corrupt data"));
}

#[test]
fn remove_deletes_entry() {
    let tmp = workspace();

    let add = run(
        &tmp,
        PASSWORD,
        &["add", "--service", "example.com", "--username", "alice", "--password", "s3cr3t"],
    )
    .success();
    let id = printed_id(&add.get_output().stdout);

    run(&tmp, PASSWORD, &["remove", &id])
        .success()
        .stdout(predicate::str::contains("Removed"));

    run(&tmp, PASSWORD, &["remove", &id])
        .failure()
        .stderr(predicate::str::contains("not found"));

    run(&tmp, PASSWORD, &["list"])
        .success()
        .stdout(predicate::str::contains("example.com").not());
}

#[test]
fn vault_flag_and_env_select_the_file() {
    let tmp = workspace();

    run(&tmp, PASSWORD, &["init", "--vault", "custom.vault"]).success();
    tmp.child("custom.vault").assert(predicate::path::exists());
    tmp.child(".vault").assert(predicate::path::missing());

    pmvault()
        .current_dir(tmp.path())
        .env("PM_PASSWORD", PASSWORD)
        .env("PM_VAULT", "from-env.vault")
        .arg("init")
        .assert()
        .success();
    tmp.child("from-env.vault").assert(predicate::path::exists());
}

#[test]
fn invalid_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child("pmconfig.toml").write_str("not valid {{toml").unwrap();

    run(&tmp, PASSWORD, &["init"])
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}

// ---------------------------------------------------------------------------
// Sharing between vaults
// ---------------------------------------------------------------------------

#[test]
fn genkeys_export_import_flow() {
    let tmp = workspace();

    run(&tmp, PASSWORD, &["genkeys", "bob.pub", "bob.key", "--pem"])
        .success()
        .stdout(predicate::str::contains("Public key written"));
    tmp.child("bob.pub")
        .assert(predicate::str::starts_with("-----BEGIN PUBLIC KEY-----"));

    let add = run(
        &tmp,
        PASSWORD,
        &["add", "--service", "example.com", "--username", "alice", "--password", "s3cr3t"],
    )
    .success();
    let id = printed_id(&add.get_output().stdout);

    run(&tmp, PASSWORD, &["export", &id, "bob.pub", "entry.pmx"])
        .success()
        .stdout(predicate::str::contains("Exported"));
    tmp.child("entry.pmx").assert(predicate::path::exists());

    // Bob imports into his own vault with his own password.
    let import = run(
        &tmp,
        "battery-staple",
        &["import", "bob.key", "entry.pmx", "--vault", "bob.vault"],
    )
    .success()
    .stdout(predicate::str::contains("Imported 'example.com'"));
    assert_ne!(printed_id(&import.get_output().stdout), id);

    run(&tmp, "battery-staple", &["list", "--show-passwords", "--vault", "bob.vault"])
        .success()
        .stdout(predicate::str::contains("s3cr3t"));
}

#[test]
fn import_with_wrong_key_fails() {
    let tmp = workspace();

    run(&tmp, PASSWORD, &["genkeys", "bob.pub", "bob.key"]).success();
    run(&tmp, PASSWORD, &["genkeys", "eve.pub", "eve.key"]).success();

    let add = run(
        &tmp,
        PASSWORD,
        &["add", "--service", "example.com", "--username", "alice", "--password", "s3cr3t"],
    )
    .success();
    let id = printed_id(&add.get_output().stdout);

    run(&tmp, PASSWORD, &["export", &id, "bob.pub", "entry.pmx"]).success();

    run(&tmp, PASSWORD, &["import", "eve.key", "entry.pmx"])
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn export_unknown_id_fails() {
    let tmp = workspace();
    run(&tmp, PASSWORD, &["genkeys", "bob.pub", "bob.key"]).success();

    run(&tmp, PASSWORD, &["export", "missing", "bob.pub", "entry.pmx"])
        .failure()
        .stderr(predicate::str::contains("not found"));
    tmp.child("entry.pmx").assert(predicate::path::missing());
}
