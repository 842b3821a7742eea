use clap::Parser;
use pwsvault::cli::commands::{self, add::NewRecord};
use pwsvault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so exported data on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::List { ref filter } => commands::list::execute(&cli, filter.as_deref()),
        Commands::Show { ref title, reveal } => commands::show::execute(&cli, title, reveal),
        Commands::Add {
            ref title,
            ref user,
            ref group,
            ref url,
            ref notes,
            ref password,
        } => commands::add::execute(
            &cli,
            &NewRecord {
                title,
                user,
                group,
                url,
                notes,
                password: password.as_deref(),
            },
        ),
        Commands::Edit {
            ref title,
            ref changes,
        } => commands::edit::execute(&cli, title, changes),
        Commands::Delete { ref title, force } => commands::delete::execute(&cli, title, force),
        Commands::Merge { ref other, yes } => commands::merge::execute(&cli, other, yes),
        Commands::Export {
            ref format,
            ref output,
        } => commands::export::execute(&cli, format, output.as_deref()),
        Commands::Passwd => commands::passwd::execute(&cli),
        Commands::Info => commands::info::execute(&cli),
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind(), "command failed");
        pwsvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
