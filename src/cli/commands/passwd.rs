//! `pwsvault passwd`: change the master password.
//!
//! The current password comes from `PWSVAULT_PASSWORD` or a prompt. The new
//! one comes from `PWSVAULT_NEW_PASSWORD` or a confirmed prompt; it is never
//! taken from `PWSVAULT_PASSWORD`, so scripted use must set both.

use crate::cli::output;
use crate::cli::{prompt_confirmed_password, prompt_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::Vault;

/// Environment variable holding the new password for scripted use.
pub const NEW_PASSWORD_ENV: &str = "PWSVAULT_NEW_PASSWORD";

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    let old = prompt_password("Current vault password")?;
    let mut vault = Vault::open(&path, old.as_bytes())?;

    let new = match std::env::var(NEW_PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => zeroize::Zeroizing::new(pw),
        _ => prompt_confirmed_password()?,
    };
    if new.as_str() == old.as_str() {
        return Err(VaultError::CommandFailed(
            "new password is the same as the current one".into(),
        ));
    }

    vault.save(&path, new.as_bytes())?;
    output::success("Master password changed");

    Ok(())
}
