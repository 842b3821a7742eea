use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwsvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Container errors ---
    #[error("Not a supported vault file: {0}")]
    UnsupportedVersion(String),

    #[error("Incorrect password")]
    BadPassword,

    #[error("Invalid vault format: {0}")]
    InvalidFormat(String),

    #[error("File integrity check failed — vault may be corrupted or tampered")]
    HmacMismatch,

    #[error("Saved vault failed verification, original left untouched: {0}")]
    SelfCheckFailed(String),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Coarse classification of a [`VaultError`].
///
/// Version and password failures invite the caller to retry with another
/// file or password; format and IO failures mean the operation should be
/// abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Version,
    BadPassword,
    Format,
    Io,
    Other,
}

impl VaultError {
    /// Map this error onto the four-way container taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedVersion(_) => ErrorKind::Version,
            Self::BadPassword => ErrorKind::BadPassword,
            Self::InvalidFormat(_) | Self::HmacMismatch | Self::SelfCheckFailed(_) => {
                ErrorKind::Format
            }
            Self::Io(_) | Self::VaultNotFound(_) => ErrorKind::Io,
            _ => ErrorKind::Other,
        }
    }

    /// Returns `true` if retrying with a different file or password may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Version | ErrorKind::BadPassword)
    }
}

/// Convenience type alias for pwsvault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_failures_are_format_errors() {
        assert_eq!(VaultError::HmacMismatch.kind(), ErrorKind::Format);
        assert_eq!(
            VaultError::SelfCheckFailed("x".into()).kind(),
            ErrorKind::Format
        );
        assert_eq!(
            VaultError::InvalidFormat("x".into()).kind(),
            ErrorKind::Format
        );
    }

    #[test]
    fn only_version_and_password_errors_are_retryable() {
        assert!(VaultError::BadPassword.is_retryable());
        assert!(VaultError::UnsupportedVersion("PWS4".into()).is_retryable());
        assert!(!VaultError::HmacMismatch.is_retryable());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(!VaultError::Io(io).is_retryable());
    }
}
