//! # CLI Command Implementations
//!
//! Each subcommand of `noir-mirror` lives in its own file with:
//! - An `Args` struct deriving `clap::Args`.
//! - An `execute` function that runs the command on top of the
//!   `noir_mirror` library.
//!
//! [`MirrorArgs`] holds the options every mirror-facing command shares.

pub mod completions;
pub mod docs;
pub mod list;
pub mod search;
pub mod status;
pub mod stdlib;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use noir_mirror::catalog;
use noir_mirror::config::MirrorConfig;
use noir_mirror::pin::RepositoryPin;

/// Where the mirror lives and which pin table describes it.
#[derive(Args, Debug, Clone)]
pub struct MirrorArgs {
    /// Directory holding the mirrored repositories.
    ///
    /// Defaults to `NOIR_MIRROR_DIR`, then the system cache directory
    /// (`~/.cache/noir-mirror/repos` on Linux, `~/Library/Caches/noir-mirror/repos`
    /// on macOS).
    #[arg(long, value_name = "DIR")]
    pub mirror_dir: Option<PathBuf>,

    /// YAML pin table to use instead of the built-in one.
    #[arg(long, value_name = "FILE", env = "NOIR_MIRROR_CATALOG")]
    pub catalog: Option<PathBuf>,
}

impl MirrorArgs {
    /// The configuration for this invocation: [`MirrorConfig::from_env`] is
    /// the only reader of `NOIR_MIRROR_DIR` and `NOIR_VERSION`; the command
    /// line is applied on top.
    pub fn config(&self) -> MirrorConfig {
        let mut config = MirrorConfig::from_env();
        if let Some(dir) = &self.mirror_dir {
            config.root = dir.clone();
        }
        config
    }

    /// The pin table, loaded from `--catalog` when given.
    pub fn pins(&self) -> Result<Vec<RepositoryPin>> {
        match &self.catalog {
            Some(path) => {
                if !path.exists() {
                    return Err(noir_mirror::suggestions::catalog_not_found(path));
                }
                catalog::from_file(path)
                    .with_context(|| format!("Failed to load pin table from {}", path.display()))
            }
            None => Ok(catalog::default_pins()),
        }
    }
}
