//! # Status Command Implementation
//!
//! Implements the `status` subcommand: for every pinned repository, whether
//! it is present in the mirror and which commit it is on. State is read
//! from disk on every call; nothing is cached.

use anyhow::Result;
use clap::Args;

use noir_mirror::catalog::{self, VersionOverrides};
use noir_mirror::mirror::{LibraryEntry, MirrorStore};
use noir_mirror::output::{emoji, OutputConfig};
use noir_mirror::pin::Category;

use super::MirrorArgs;

/// Show which repositories are mirrored and at which commit
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Only show repositories in this category.
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Option<Category>,

    /// Print entries as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, color_flag: &str) -> Result<()> {
    let config = args.mirror.config();
    let overrides = VersionOverrides {
        core: config.core_version.clone(),
        aztec: None,
    };
    let pins: Vec<_> = catalog::apply_overrides(args.mirror.pins()?, &overrides)
        .into_iter()
        .filter(|pin| args.category.map_or(true, |c| pin.category == c))
        .collect();

    let entries = MirrorStore::new(&config).library_entries(&pins);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Mirror: {}",
        emoji(&out, "📦", "[MIRROR]"),
        config.root.display()
    );

    for category in Category::ALL {
        let rows: Vec<&LibraryEntry> = entries.iter().filter(|e| e.category == category).collect();
        if rows.is_empty() {
            continue;
        }
        println!("\n{}:", category);
        for entry in rows {
            print_entry(&out, entry);
        }
    }

    let cloned = entries.iter().filter(|e| e.cloned).count();
    println!("\n{} of {} repositories mirrored", cloned, entries.len());
    Ok(())
}

fn print_entry(out: &OutputConfig, entry: &LibraryEntry) {
    let reference = format!("{} {}", entry.ref_kind, entry.ref_name);
    if entry.cloned {
        println!(
            "  {} {} {} {}",
            emoji(out, "✅", "[OK]"),
            out.name(&entry.name),
            reference,
            out.dim(entry.commit.as_deref().unwrap_or("unknown"))
        );
    } else {
        println!(
            "  {} {} {} {}",
            emoji(out, "⬜", "[--]"),
            out.name(&entry.name),
            reference,
            out.dim("not mirrored")
        );
    }
}
