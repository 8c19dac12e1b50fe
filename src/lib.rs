//! # Noir Mirror Library
//!
//! This library keeps a local mirror of Noir language repositories pinned to
//! specific versions and searches it. It is designed to be used by the
//! `noir-mirror` command-line tool but can also be embedded in other tools
//! that need offline access to Noir sources and documentation.
//!
//! ## Quick Example
//!
//! ```no_run
//! use noir_mirror::catalog;
//! use noir_mirror::config::MirrorConfig;
//! use noir_mirror::search::{SearchEngine, SearchOptions};
//! use noir_mirror::sync::{SyncOrchestrator, SyncRequest};
//!
//! let config = MirrorConfig::new("/tmp/noir-mirror");
//!
//! // Check out the core repositories at a release tag
//! let request = SyncRequest {
//!     version: Some("1.0.0-beta.3".to_string()),
//!     ..Default::default()
//! };
//! let batch = SyncOrchestrator::new(&config).run(catalog::default_pins(), &request, &mut |_| {});
//! assert!(batch.success);
//!
//! // Search the standard library
//! let results = SearchEngine::new(&config).search_stdlib("poseidon2", 10).unwrap();
//! for result in results {
//!     println!("{}:{} {}", result.file, result.line.unwrap_or(0), result.content);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Pins (`pin`, `catalog`)**: the ordered table of repositories, each
//!   pinned to a commit, tag or branch and optionally restricted to sparse
//!   paths.
//! - **Mirror Store (`mirror`)**: one working tree per pin under the mirror
//!   root, plus read-only introspection of what is on disk.
//! - **Reconciliation (`reconcile`, `checkout`)**: decides whether an entry
//!   can be kept or must be recloned, and produces a matching working tree
//!   with the least transfer.
//! - **Sync (`sync`)**: runs reconciliation over a selection of pins,
//!   isolating failures per repository.
//! - **Search (`search`)**: line search through `rg` or an in-process scan,
//!   with mirror-relative results.
//! - **Git (`git`, `repository`, `process`)**: git subprocesses behind the
//!   `GitOperations` trait, each run under a deadline.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod mirror;
pub mod output;
pub mod pin;
pub mod process;
pub mod reconcile;
pub mod repository;
pub mod search;
pub mod suggestions;
pub mod sync;

#[cfg(test)]
mod testing;
