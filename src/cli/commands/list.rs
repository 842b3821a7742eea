//! `pwsvault list`: display records in a table.

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::{Record, Vault};

/// Execute the `list` command.
pub fn execute(cli: &Cli, filter: Option<&str>) -> Result<()> {
    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let vault = Vault::open(&path, password.as_bytes())?;

    let needle = filter.map(str::to_lowercase);
    let records: Vec<&Record> = vault
        .records()
        .iter()
        .filter(|r| match &needle {
            Some(n) => {
                r.title().to_lowercase().contains(n) || r.group().to_lowercase().contains(n)
            }
            None => true,
        })
        .collect();

    output::info(&format!(
        "{} — {} of {} record(s)",
        path.display(),
        records.len(),
        vault.record_count()
    ));
    output::print_records_table(&records);

    Ok(())
}
