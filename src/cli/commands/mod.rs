//! One module per subcommand.

pub mod add;
pub mod delete;
pub mod edit;
pub mod export;
pub mod info;
pub mod init;
pub mod list;
pub mod merge;
pub mod passwd;
pub mod show;
