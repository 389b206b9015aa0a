//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Record;

/// Shown in place of a password unless `--show-passwords` is given.
const MASK: &str = "********";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of records (Id, Service, Username, Password, Notes, Updated).
pub fn print_records_table(records: &[Record], show_passwords: bool) {
    if records.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `pmvault add --service <NAME> --username <USER>` to add one.");
        return;
    }

    println!("{}", records_table(records, show_passwords));
}

fn records_table(records: &[Record], show_passwords: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Service", "Username", "Password", "Notes", "Updated"]);

    for r in records {
        let password = if show_passwords {
            r.password.clone()
        } else {
            MASK.to_string()
        };
        table.add_row(vec![
            r.id.clone(),
            r.service.clone(),
            r.username.clone(),
            password,
            r.notes.clone().unwrap_or_default(),
            r.updated_at_utc.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    table
}
