//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Noir Mirror - Keep pinned Noir repositories offline and search them
#[derive(Parser, Debug)]
#[command(name = "noir-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        global = true,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace); RUST_LOG wins when set
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or update mirrored repositories to their pinned versions
    Sync(commands::sync::SyncArgs),

    /// Search code in the mirrored repositories
    Search(commands::search::SearchArgs),

    /// Search the Noir documentation
    Docs(commands::docs::DocsArgs),

    /// Search the Noir standard library
    Stdlib(commands::stdlib::StdlibArgs),

    /// Show which repositories are mirrored and at which commit
    Status(commands::status::StatusArgs),

    /// List the pinned repositories
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let color = self.color.as_str();
        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, color),
            Commands::Search(args) => commands::search::execute(args, color),
            Commands::Docs(args) => commands::docs::execute(args, color),
            Commands::Stdlib(args) => commands::stdlib::execute(args, color),
            Commands::Status(args) => commands::status::execute(args, color),
            Commands::List(args) => commands::list::execute(args, color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Log to stderr at `level` unless `RUST_LOG` says otherwise.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
