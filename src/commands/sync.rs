//! # Sync Command Implementation
//!
//! Implements the `sync` subcommand: bring the selected mirror entries in
//! line with their pins.
//!
//! - **Selection**: `--repo` names win over `--category`; with neither, the
//!   core repositories are synced.
//! - **Versions**: `--noir-version` pins the `noir` repository to a release
//!   tag, falling back to `NOIR_VERSION` from the configuration;
//!   `--aztec-version` does the same for `aztec-packages`.
//! - **Failures**: one repository failing does not stop the others; the
//!   command exits non-zero when any repository failed.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use noir_mirror::output::{emoji, status_marker, OutputConfig};
use noir_mirror::pin::Category;
use noir_mirror::suggestions;
use noir_mirror::sync::{SyncEvent, SyncOrchestrator, SyncRequest};

use super::MirrorArgs;

/// Clone or update mirrored repositories to their pinned versions
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Noir release to pin the `noir` repository to (e.g. `1.0.0-beta.3`).
    ///
    /// Defaults to `NOIR_VERSION` when set.
    #[arg(long, value_name = "VERSION")]
    pub noir_version: Option<String>,

    /// Aztec release to pin `aztec-packages` to.
    #[arg(long, value_name = "VERSION")]
    pub aztec_version: Option<String>,

    /// Remove and clone again even when a repository is already up to date.
    #[arg(short, long)]
    pub force: bool,

    /// Repository to sync; may be repeated.
    #[arg(short, long = "repo", value_name = "NAME")]
    pub repos: Vec<String>,

    /// Category to sync (core, libraries, reference); may be repeated.
    #[arg(short, long = "category", value_name = "CATEGORY", value_delimiter = ',')]
    pub categories: Vec<Category>,

    /// Deadline in seconds for each git command.
    #[arg(long, value_name = "SECONDS")]
    pub git_timeout: Option<u64>,

    /// Print the batch result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let mut config = args.mirror.config();
    if let Some(seconds) = args.git_timeout {
        config = config.with_git_timeout(Duration::from_secs(seconds));
    }
    let pins = args.mirror.pins()?;

    if let Some(unknown) = args
        .repos
        .iter()
        .find(|name| !pins.iter().any(|p| &p.name == *name))
    {
        return Err(suggestions::unknown_repository(unknown, &pins));
    }

    if !args.json {
        println!(
            "{} Syncing into {}",
            emoji(&out, "🔄", "[SYNC]"),
            config.root.display()
        );
    }

    let request = SyncRequest {
        version: args.noir_version,
        aztec_version: args.aztec_version,
        force: args.force,
        repos: args.repos,
        categories: args.categories,
    };

    let spinner = if out.show_progress() && !args.json {
        Some(spinner())
    } else {
        None
    };

    let orchestrator = SyncOrchestrator::new(&config);
    let batch = orchestrator.run(pins, &request, &mut |event| match event {
        SyncEvent::Started(pin) => {
            if let Some(pb) = &spinner {
                pb.set_message(format!("Syncing {}...", pin.name));
            }
        }
        SyncEvent::Finished(outcome) => {
            if args.json {
                return;
            }
            let line = if outcome.ok {
                format!("{} {}", status_marker(&out, true), outcome.status)
            } else {
                format!(
                    "{} {}: {}",
                    status_marker(&out, false),
                    out.name(&outcome.name),
                    outcome.status
                )
            };
            match &spinner {
                Some(pb) => pb.println(line),
                None => println!("{}", line),
            }
        }
    });

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!("\n{}", batch.message);
    }

    if batch.success {
        return Ok(());
    }
    if batch.outcomes.is_empty() {
        anyhow::bail!("{}", batch.message);
    }
    let failed = batch.outcomes.iter().filter(|o| !o.ok).count();
    Err(suggestions::sync_failed(failed, batch.outcomes.len()))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
