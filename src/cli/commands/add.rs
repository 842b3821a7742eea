//! `pwsvault add`: append a record to the vault.

use crate::cli::output;
use crate::cli::{prompt_password, record_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::{Record, Vault};

/// New record values collected from the command line.
pub struct NewRecord<'a> {
    pub title: &'a str,
    pub user: &'a str,
    pub group: &'a str,
    pub url: &'a str,
    pub notes: &'a str,
    pub password: Option<&'a str>,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, new: &NewRecord<'_>) -> Result<()> {
    let path = vault_path(cli)?;

    let passwd = record_password(new.password)?;

    let password = prompt_password("Vault password")?;
    let mut vault = Vault::open(&path, password.as_bytes())?;

    if vault.find_by_title(new.title).is_some() {
        output::warning(&format!(
            "A record titled '{}' already exists; adding another.",
            new.title
        ));
    }

    let mut record = Record::create();
    record.set_title(new.title);
    record.set_group(new.group);
    record.set_user(new.user);
    record.set_notes(new.notes);
    record.set_url(new.url);
    record.set_passwd(&passwd);

    vault.add_record(record);
    vault.save(&path, password.as_bytes())?;

    output::success(&format!(
        "Record '{}' added ({} total)",
        new.title,
        vault.record_count()
    ));

    Ok(())
}
