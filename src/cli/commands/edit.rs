//! `pwsvault edit`: change fields of an existing record.
//!
//! Only the fields passed on the command line are touched; each change
//! also refreshes the record's modification time.

use crate::cli::output;
use crate::cli::{prompt_password, vault_path, Cli, RecordChanges};
use crate::errors::{Result, VaultError};
use crate::vault::{Record, Vault};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, title: &str, changes: &RecordChanges) -> Result<()> {
    if changes.is_empty() {
        return Err(VaultError::CommandFailed(
            "nothing to change — pass at least one of --new-title, --user, --group, --url, --notes, --password".into(),
        ));
    }

    let path = vault_path(cli)?;
    let password = prompt_password("Vault password")?;
    let mut vault = Vault::open(&path, password.as_bytes())?;

    let index = vault
        .find_by_title(title)
        .ok_or_else(|| VaultError::RecordNotFound(title.to_string()))?;
    apply_changes(&mut vault.records_mut()[index], changes);

    vault.save(&path, password.as_bytes())?;
    output::success(&format!("Record '{title}' updated"));

    Ok(())
}

/// Apply the requested changes to `record`.
pub fn apply_changes(record: &mut Record, changes: &RecordChanges) {
    if let Some(v) = &changes.new_title {
        record.set_title(v);
    }
    if let Some(v) = &changes.user {
        record.set_user(v);
    }
    if let Some(v) = &changes.group {
        record.set_group(v);
    }
    if let Some(v) = &changes.url {
        record.set_url(v);
    }
    if let Some(v) = &changes.notes {
        record.set_notes(v);
    }
    if let Some(v) = &changes.password {
        record.set_passwd(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_requested_fields_change() {
        let mut record = Record::create();
        record.set_title("Mail");
        record.set_user("bob");

        let changes = RecordChanges {
            url: Some("https://mail.example.com".into()),
            ..RecordChanges::default()
        };
        apply_changes(&mut record, &changes);

        assert_eq!(record.title(), "Mail");
        assert_eq!(record.user(), "bob");
        assert_eq!(record.url(), "https://mail.example.com");
    }
}
