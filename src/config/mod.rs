//! Configuration loaded from `.pwsvault.toml`.

pub mod settings;

pub use settings::Settings;
