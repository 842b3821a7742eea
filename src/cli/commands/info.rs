//! `pwsvault info`: print vault metadata.

use comfy_table::{ContentArrangement, Table};

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::Vault;

/// Execute the `info` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let vault = Vault::open(&path, password.as_bytes())?;

    let header = vault.header();
    let saved_by = header.last_save_app().unwrap_or_else(|| "-".to_string());
    let saved_at = header
        .last_save_time()
        .map(output::format_time)
        .unwrap_or_else(|| "-".to_string());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["File".to_string(), path.display().to_string()]);
    table.add_row(vec!["Format".to_string(), format!("{:?}", vault.version())]);
    table.add_row(vec!["Iterations".to_string(), vault.iterations().to_string()]);
    table.add_row(vec!["Records".to_string(), vault.record_count().to_string()]);
    table.add_row(vec!["Header fields".to_string(), header.len().to_string()]);
    table.add_row(vec!["Last saved".to_string(), saved_at]);
    table.add_row(vec!["Saved by".to_string(), saved_by]);
    table.add_row(vec!["HMAC".to_string(), hex(vault.hmac())]);

    println!("{table}");
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
