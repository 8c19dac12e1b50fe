//! # List Command Implementation
//!
//! Implements the `list` subcommand: print the pin table itself (name,
//! category, ref, sparse paths, URL) without touching the mirror.

use anyhow::Result;
use clap::Args;

use noir_mirror::output::OutputConfig;
use noir_mirror::pin::Category;

use super::MirrorArgs;

/// List the pinned repositories
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Only list repositories in this category.
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Option<Category>,

    /// Print the pin table as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, color_flag: &str) -> Result<()> {
    let pins: Vec<_> = args
        .mirror
        .pins()?
        .into_iter()
        .filter(|pin| args.category.map_or(true, |c| pin.category == c))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pins)?);
        return Ok(());
    }

    let out = OutputConfig::from_env_and_flag(color_flag);
    for pin in &pins {
        println!(
            "{} [{}] {}",
            out.name(&pin.name),
            pin.category,
            pin.ref_spec()
        );
        if !pin.description.is_empty() {
            println!("    {}", pin.description);
        }
        if let Some(paths) = pin.sparse() {
            println!("    {}", out.dim(&format!("sparse: {}", paths.join(", "))));
        }
        println!("    {}", out.dim(&pin.url));
    }
    Ok(())
}
