//! `pwsvault export`: export records in clear text.
//!
//! Supported formats:
//! - `csv` (default): header line plus one quoted row per record
//! - `json`: array of record objects

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{Record, Vault};

/// One exported record.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExportRow {
    pub uuid: String,
    pub group: String,
    pub title: String,
    pub user: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub last_modified: u32,
}

impl From<&Record> for ExportRow {
    fn from(r: &Record) -> Self {
        Self {
            uuid: r.uuid().map(|u| u.to_string()).unwrap_or_default(),
            group: r.group().to_string(),
            title: r.title().to_string(),
            user: r.user().to_string(),
            password: r.passwd().to_string(),
            url: r.url().to_string(),
            notes: r.notes().to_string(),
            last_modified: r.last_mod(),
        }
    }
}

/// Execute the `export` command.
pub fn execute(cli: &Cli, format: &str, output_path: Option<&str>) -> Result<()> {
    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let vault = Vault::open(&path, password.as_bytes())?;

    let rows: Vec<ExportRow> = vault.records().iter().map(ExportRow::from).collect();

    let content = match format {
        "csv" => format_as_csv(&rows),
        "json" => format_as_json(&rows)?,
        other => {
            return Err(VaultError::CommandFailed(format!(
                "unknown export format '{other}' — use 'csv' or 'json'"
            )));
        }
    };

    match output_path {
        Some(dest) => {
            let dest_path = Path::new(dest);

            // Refuse to overwrite the vault being exported.
            if dest_path == path.as_path() {
                return Err(VaultError::CommandFailed(
                    "refusing to export over the vault file".into(),
                ));
            }

            fs::write(dest_path, &content).map_err(|e| {
                VaultError::CommandFailed(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!(
                "Exported {} records to {} (format: {})",
                rows.len(),
                dest,
                format
            ));
            output::warning("The export file contains passwords in clear text.");
        }
        None => {
            print!("{content}");
        }
    }

    Ok(())
}

/// Format rows as CSV, quoting every value.
fn format_as_csv(rows: &[ExportRow]) -> String {
    use std::fmt::Write;
    let mut out = String::from("uuid,group,title,user,password,url,notes,last_modified\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            csv_quote(&row.uuid),
            csv_quote(&row.group),
            csv_quote(&row.title),
            csv_quote(&row.user),
            csv_quote(&row.password),
            csv_quote(&row.url),
            csv_quote(&row.notes),
            row.last_modified
        );
    }
    out
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Format rows as a JSON array.
fn format_as_json(rows: &[ExportRow]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(rows)
        .map_err(|e| VaultError::SerializationError(format!("JSON export: {e}")))?;
    json.push('\n');
    Ok(json)
}
