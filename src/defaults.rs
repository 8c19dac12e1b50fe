//! Default values for noir-mirror configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the mirror root directory.
pub const MIRROR_DIR_ENV: &str = "NOIR_MIRROR_DIR";

/// Environment variable supplying the default Noir version tag.
pub const CORE_VERSION_ENV: &str = "NOIR_VERSION";

/// Environment variable pointing at a YAML pin table.
pub const CATALOG_ENV: &str = "NOIR_MIRROR_CATALOG";

/// External line matcher probed before falling back to the in-process scan.
pub const DEFAULT_MATCHER: &str = "rg";

/// Glob for code searches.
pub const DEFAULT_FILE_PATTERN: &str = "*.nr";

/// Glob for documentation searches.
pub const DOCS_FILE_PATTERN: &str = "*.{md,mdx}";

/// Documentation tree inside the core repository, relative to the mirror root.
pub const DOCS_SCOPE: &str = "noir/docs/docs";

/// Standard library sources, relative to the mirror root.
pub const STDLIB_SCOPE: &str = "noir/noir_stdlib/src";

pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DOCS_MAX_RESULTS: usize = 20;
pub const STDLIB_MAX_RESULTS: usize = 30;

/// Deadline for a single git command; clones of large repositories are slow.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Deadline for one invocation of the external matcher.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the default mirror root directory.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/noir-mirror/repos` (XDG Base Directory)
/// - macOS: `~/Library/Caches/noir-mirror/repos`
/// - Windows: `{FOLDERID_LocalAppData}\noir-mirror\repos`
///
/// Falls back to `.noir-mirror/repos` in the current directory if the
/// platform cache directory cannot be determined.
///
/// This can be overridden by the `--mirror-dir` CLI flag or the
/// `NOIR_MIRROR_DIR` environment variable.
pub fn default_mirror_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("noir-mirror"))
        .unwrap_or_else(|| PathBuf::from(".noir-mirror"))
        .join("repos")
}
