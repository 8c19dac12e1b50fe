//! # Docs Command Implementation
//!
//! Implements the `docs` subcommand: search the Markdown documentation of
//! the mirrored `noir` repository, optionally within one section such as
//! `noir/concepts` or `tooling`.

use anyhow::Result;
use clap::Args;

use noir_mirror::defaults;
use noir_mirror::search::SearchEngine;

use super::search::print_results;
use super::MirrorArgs;

/// Search the Noir documentation
#[derive(Args, Debug)]
pub struct DocsArgs {
    /// Text or regular expression to look for.
    pub query: String,

    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Documentation section to search, relative to the docs root.
    #[arg(long, value_name = "SECTION")]
    pub section: Option<String>,

    /// Maximum number of results.
    #[arg(short = 'n', long, value_name = "N", default_value_t = defaults::DOCS_MAX_RESULTS)]
    pub max_results: usize,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `docs` command.
pub fn execute(args: DocsArgs, color_flag: &str) -> Result<()> {
    let config = args.mirror.config();
    let results = SearchEngine::new(&config).search_docs(
        &args.query,
        args.section.as_deref(),
        args.max_results,
    )?;
    print_results(&config, &results, args.json, color_flag)
}
