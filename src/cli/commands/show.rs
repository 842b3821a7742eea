//! `pwsvault show`: print one record.

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `show` command.
pub fn execute(cli: &Cli, title: &str, reveal: bool) -> Result<()> {
    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let vault = Vault::open(&path, password.as_bytes())?;

    let index = vault
        .find_by_title(title)
        .ok_or_else(|| VaultError::RecordNotFound(title.to_string()))?;
    output::print_record(&vault.records()[index], reveal);

    Ok(())
}
