//! # Search Command Implementation
//!
//! Implements the `search` subcommand: line search across the mirrored
//! repositories. Uses `rg` when it is installed and falls back to an
//! in-process scan otherwise. Also holds the result printer shared with
//! `docs` and `stdlib`.

use anyhow::Result;
use clap::Args;

use noir_mirror::config::MirrorConfig;
use noir_mirror::defaults;
use noir_mirror::output::{emoji, OutputConfig};
use noir_mirror::search::{SearchEngine, SearchOptions, SearchResult};
use noir_mirror::suggestions;

use super::MirrorArgs;

/// Search code in the mirrored repositories
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text or regular expression to look for.
    pub query: String,

    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Glob selecting the files to search; `{a,b}` alternatives are allowed.
    #[arg(short, long, value_name = "GLOB", default_value = defaults::DEFAULT_FILE_PATTERN)]
    pub pattern: String,

    /// Restrict the search to one repository (or a path inside the mirror).
    #[arg(short, long, value_name = "NAME")]
    pub repo: Option<String>,

    /// Maximum number of results.
    #[arg(short = 'n', long, value_name = "N", default_value_t = defaults::DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Match case exactly.
    #[arg(short = 's', long)]
    pub case_sensitive: bool,

    /// External matcher program; searches in-process when it cannot run.
    #[arg(long, value_name = "PROGRAM", default_value = defaults::DEFAULT_MATCHER)]
    pub matcher: String,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `search` command.
pub fn execute(args: SearchArgs, color_flag: &str) -> Result<()> {
    let config = args.mirror.config().with_matcher(Some(args.matcher));
    let options = SearchOptions {
        file_pattern: args.pattern,
        repo: args.repo,
        max_results: args.max_results,
        case_sensitive: args.case_sensitive,
    };
    let results = SearchEngine::new(&config).search(&args.query, &options)?;
    print_results(&config, &results, args.json, color_flag)
}

/// Print search results as `file:line: content` lines or as JSON.
pub(crate) fn print_results(
    config: &MirrorConfig,
    results: &[SearchResult],
    json: bool,
    color_flag: &str,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    let out = OutputConfig::from_env_and_flag(color_flag);
    if results.is_empty() {
        println!("{} No matches", emoji(&out, "🔍", "[SCAN]"));
        if !config.root.is_dir() {
            eprintln!("\n{}", suggestions::mirror_empty(&config.root));
        }
        return Ok(());
    }

    for result in results {
        let location = match result.line {
            Some(line) => format!("{}:{}", result.file, line),
            None => result.file.clone(),
        };
        println!("{}: {}", out.name(&location), result.content);
    }
    println!(
        "\n{}",
        out.dim(&format!("{} results", results.len()))
    );
    Ok(())
}
