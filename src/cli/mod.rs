//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// Environment variable checked for the vault password before prompting.
pub const PASSWORD_ENV: &str = "PWSVAULT_PASSWORD";

/// pwsvault CLI: Password Safe V3 compatible password vault.
#[derive(Parser)]
#[command(
    name = "pwsvault",
    about = "Password Safe V3 compatible password vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: vault_file from .pwsvault.toml, else vault.psafe3)
    #[arg(short, long, global = true)]
    pub vault: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init,

    /// List records, optionally filtered by title or group
    List {
        /// Case-insensitive substring to match
        filter: Option<String>,
    },

    /// Show a single record
    Show {
        /// Record title
        title: String,
        /// Print the password in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Add a record
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long, default_value = "")]
        group: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Record password (omit for prompt or piped stdin)
        #[arg(long)]
        password: Option<String>,
    },

    /// Change fields of an existing record
    Edit {
        /// Title of the record to edit
        title: String,
        #[command(flatten)]
        changes: RecordChanges,
    },

    /// Delete a record
    Delete {
        /// Record title
        title: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Merge new and updated records from another vault
    Merge {
        /// Vault file to merge from
        other: String,
        /// Apply every candidate without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Export records to stdout or a file
    Export {
        /// Output format: csv (default) or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file path (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Change the vault's master password
    Passwd,

    /// Show vault metadata
    Info,
}

/// Optional new values for `edit`.
#[derive(clap::Args, Default)]
pub struct RecordChanges {
    /// New title
    #[arg(long = "new-title")]
    pub new_title: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub group: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.new_title.is_none()
            && self.user.is_none()
            && self.group.is_none()
            && self.url.is_none()
            && self.notes.is_none()
            && self.password.is_none()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `PWSVAULT_PASSWORD` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects `PWSVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }
    prompt_confirmed_password()
}

/// Interactively prompt for a new password twice, ignoring the environment.
pub fn prompt_confirmed_password() -> Result<Zeroizing<String>> {
    let password = dialoguer::Password::new()
        .with_prompt("Choose vault password")
        .with_confirmation("Confirm vault password", "Passwords do not match")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

    if password.is_empty() {
        return Err(VaultError::CommandFailed("password cannot be empty".into()));
    }
    Ok(Zeroizing::new(password))
}

/// Read a record password from the flag, piped stdin, or a prompt.
pub fn record_password(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = flag {
        output::warning("Password provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end().len();
        buf.truncate(trimmed);
        return Ok(buf);
    }
    let pw = dialoguer::Password::new()
        .with_prompt("Record password")
        .with_confirmation("Confirm record password", "Passwords do not match")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Resolve the vault file from `--vault` or the settings file.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    Ok(settings.vault_path(&cwd, cli.vault.as_deref()))
}
