//! `pwsvault init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_path, Cli};
use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    if path.exists() {
        output::tip("Use `pwsvault add` to add records to the existing vault.");
        return Err(VaultError::VaultAlreadyExists(path));
    }

    let password = prompt_new_password()?;

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let mut vault = Vault::create_with_iterations(password.as_bytes(), settings.stretch_iterations)?;
    vault.save(&path, password.as_bytes())?;

    output::success(&format!("Vault created at {}", path.display()));
    output::tip("Add your first record: pwsvault add --title <TITLE>");

    Ok(())
}
