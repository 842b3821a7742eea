//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::Record;

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

/// Format a unix timestamp for display; `0` means never recorded.
pub fn format_time(secs: u32) -> String {
    if secs == 0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp(i64::from(secs), 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Print a table of records (Group, Title, User, URL, Modified).
pub fn print_records_table(records: &[&Record]) {
    if records.is_empty() {
        info("No matching records.");
        tip("Run `pwsvault add --title <TITLE>` to add a record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Group", "Title", "User", "URL", "Modified"]);

    for r in records {
        table.add_row(vec![
            r.group().to_string(),
            r.title().to_string(),
            r.user().to_string(),
            r.url().to_string(),
            format_time(r.last_mod()),
        ]);
    }

    println!("{table}");
}

/// Print every field of a single record.
pub fn print_record(record: &Record, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let uuid = record
        .uuid()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "-".to_string());
    let passwd = if reveal {
        record.passwd().to_string()
    } else {
        "********".to_string()
    };

    table.add_row(vec!["Title", record.title()]);
    table.add_row(vec!["Group", record.group()]);
    table.add_row(vec!["User", record.user()]);
    table.add_row(vec!["Password", passwd.as_str()]);
    table.add_row(vec!["URL", record.url()]);
    table.add_row(vec!["Notes", record.notes()]);
    table.add_row(vec!["UUID", uuid.as_str()]);
    let modified = format_time(record.last_mod());
    table.add_row(vec!["Modified", modified.as_str()]);

    println!("{table}");
}
