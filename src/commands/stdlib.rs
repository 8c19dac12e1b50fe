//! # Stdlib Command Implementation
//!
//! Implements the `stdlib` subcommand: search the Noir standard library
//! sources of the mirrored `noir` repository.

use anyhow::Result;
use clap::Args;

use noir_mirror::defaults;
use noir_mirror::search::SearchEngine;

use super::search::print_results;
use super::MirrorArgs;

/// Search the Noir standard library
#[derive(Args, Debug)]
pub struct StdlibArgs {
    /// Text or regular expression to look for.
    pub query: String,

    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Maximum number of results.
    #[arg(short = 'n', long, value_name = "N", default_value_t = defaults::STDLIB_MAX_RESULTS)]
    pub max_results: usize,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `stdlib` command.
pub fn execute(args: StdlibArgs, color_flag: &str) -> Result<()> {
    let config = args.mirror.config();
    let results = SearchEngine::new(&config).search_stdlib(&args.query, args.max_results)?;
    print_results(&config, &results, args.json, color_flag)
}
