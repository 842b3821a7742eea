//! `pwsvault merge`: pull new and updated records from another vault.
//!
//! The other vault is opened with the same password first; if that fails
//! with a bad password, its own password is prompted for.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::{MergeReason, Vault};

/// Execute the `merge` command.
pub fn execute(cli: &Cli, other: &str, yes: bool) -> Result<()> {
    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let mut vault = Vault::open(&path, password.as_bytes())?;

    let other_path = Path::new(other);
    let source = match Vault::open(other_path, password.as_bytes()) {
        Err(VaultError::BadPassword) => {
            let pw = dialoguer::Password::new()
                .with_prompt(format!("Password for {other}"))
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
            Vault::open(other_path, pw.as_bytes())?
        }
        result => result?,
    };

    let candidates = vault.merge_candidates(&source);
    if candidates.is_empty() {
        output::info("Nothing to merge, every record is up to date.");
        return Ok(());
    }

    let mut applied = 0usize;
    for candidate in &candidates {
        let label = match candidate.reason {
            MergeReason::New => format!("'{}' (new)", candidate.incoming.title()),
            MergeReason::UpdatesExisting => format!(
                "'{}' (updates existing, modified {})",
                candidate.incoming.title(),
                output::format_time(candidate.incoming.last_mod())
            ),
        };

        let accept = yes
            || Confirm::new()
                .with_prompt(format!("Merge {label}?"))
                .default(true)
                .interact()
                .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if accept {
            vault.apply_merge(candidate)?;
            applied += 1;
        }
    }

    if applied == 0 {
        output::info("No records merged.");
        return Ok(());
    }

    vault.sort_records();
    vault.save(&path, password.as_bytes())?;
    output::success(&format!(
        "Merged {applied} of {} record(s) from {other}",
        candidates.len()
    ));

    Ok(())
}
