use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_ITERATIONS;
use crate::errors::{Result, VaultError};

/// Tool configuration, loaded from `.pwsvault.toml`.
///
/// Every field has a sensible default so pwsvault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file used when `--vault` is not given.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Stretching iterations for newly created vaults (default: 2048).
    ///
    /// Existing vaults always use the count stored in the file.
    #[serde(default = "default_stretch_iterations")]
    pub stretch_iterations: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "vault.psafe3".to_string()
}

fn default_stretch_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            stretch_iterations: default_stretch_iterations(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    const FILE_NAME: &'static str = ".pwsvault.toml";

    /// Load settings from `<dir>/.pwsvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.stretch_iterations == 0 {
            return Err(VaultError::ConfigError(
                "stretch_iterations must be at least 1".into(),
            ));
        }

        Ok(settings)
    }

    /// Resolve the vault path: an explicit override, else `vault_file`
    /// relative to `dir`.
    pub fn vault_path(&self, dir: &Path, explicit: Option<&str>) -> PathBuf {
        match explicit {
            Some(p) => PathBuf::from(p),
            None => dir.join(&self.vault_file),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_file, "vault.psafe3");
        assert_eq!(s.stretch_iterations, 2048);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.stretch_iterations, 2048);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_file = "team.psafe3"
stretch_iterations = 100000
"#;
        fs::write(tmp.path().join(".pwsvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "team.psafe3");
        assert_eq!(settings.stretch_iterations, 100_000);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwsvault.toml"), "vault_file = \"x.psafe3\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "x.psafe3");
        assert_eq!(settings.stretch_iterations, 2048);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwsvault.toml"), "not valid {{toml").unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn load_rejects_zero_iterations() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".pwsvault.toml"), "stretch_iterations = 0\n").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::ConfigError(_))
        ));
    }

    #[test]
    fn vault_path_prefers_explicit() {
        let s = Settings::default();
        let dir = Path::new("/home/user");
        assert_eq!(
            s.vault_path(dir, None),
            PathBuf::from("/home/user/vault.psafe3")
        );
        assert_eq!(
            s.vault_path(dir, Some("/tmp/other.psafe3")),
            PathBuf::from("/tmp/other.psafe3")
        );
    }
}
