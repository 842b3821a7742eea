//! `pwsvault delete`: remove a record from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, title: &str, force: bool) -> Result<()> {
    let path = vault_path(cli)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete record '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let password = prompt_password("Vault password")?;
    let mut vault = Vault::open(&path, password.as_bytes())?;

    let index = vault
        .find_by_title(title)
        .ok_or_else(|| VaultError::RecordNotFound(title.to_string()))?;
    vault.remove_record(index);
    vault.save(&path, password.as_bytes())?;

    output::success(&format!("Deleted record '{title}'"));

    Ok(())
}
