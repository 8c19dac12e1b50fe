//! # Pin Table
//!
//! The ordered table of repositories the mirror tracks. The built-in table
//! covers the Noir language, its documentation and standard library, a set
//! of libraries, and reference codebases. A different table can be loaded
//! from YAML:
//!
//! ```yaml
//! - name: noir
//!   url: https://github.com/noir-lang/noir
//!   category: core
//!   sparse_paths: [noir_stdlib, docs]
//! - name: noir-bignum
//!   url: https://github.com/noir-lang/noir-bignum
//!   category: libraries
//! ```
//!
//! Two entries are distinguished: [`CORE_REPOSITORY`] takes the language
//! version as its tag, and [`AZTEC_REPOSITORY`] takes the Aztec version.
//! Both are bound late, by [`apply_overrides`], when a sync run starts.

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use semver::Version;

use crate::error::{Error, Result};
use crate::pin::{Category, RepositoryPin};

/// Name of the language repository that receives the core version tag.
pub const CORE_REPOSITORY: &str = "noir";

/// Name of the repository that receives the Aztec version tag.
pub const AZTEC_REPOSITORY: &str = "aztec-packages";

/// Late-bound version tags for the distinguished repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOverrides {
    /// Tag for [`CORE_REPOSITORY`].
    pub core: Option<String>,
    /// Tag for [`AZTEC_REPOSITORY`].
    pub aztec: Option<String>,
}

/// The built-in pin table.
pub fn default_pins() -> Vec<RepositoryPin> {
    vec![
        RepositoryPin::new(CORE_REPOSITORY, "https://github.com/noir-lang/noir", Category::Core)
            .with_sparse_paths(["noir_stdlib", "docs", "examples", "test_programs"])
            .with_description("Noir compiler, standard library and documentation"),
        RepositoryPin::new(
            "noir-examples",
            "https://github.com/noir-lang/noir-examples",
            Category::Core,
        )
        .with_description("Official example circuits and applications"),
        RepositoryPin::new(
            "noir-bignum",
            "https://github.com/noir-lang/noir-bignum",
            Category::Libraries,
        )
        .with_description("Big integer arithmetic"),
        RepositoryPin::new(
            "noir_json_parser",
            "https://github.com/noir-lang/noir_json_parser",
            Category::Libraries,
        )
        .with_description("JSON parsing"),
        RepositoryPin::new(
            "noir_string_search",
            "https://github.com/noir-lang/noir_string_search",
            Category::Libraries,
        )
        .with_description("Substring search over bounded strings"),
        RepositoryPin::new(
            "noir_sort",
            "https://github.com/noir-lang/noir_sort",
            Category::Libraries,
        )
        .with_description("Efficient sorting in circuits"),
        RepositoryPin::new(
            "awesome-noir",
            "https://github.com/noir-lang/awesome-noir",
            Category::Reference,
        )
        .with_description("Curated list of Noir resources"),
        RepositoryPin::new(
            AZTEC_REPOSITORY,
            "https://github.com/AztecProtocol/aztec-packages",
            Category::Reference,
        )
        .with_branch("next")
        .with_sparse_paths(["noir-projects/aztec-nr", "noir-projects/noir-contracts"])
        .with_description("Aztec.nr framework and example contracts"),
    ]
}

/// Normalize a version string into a tag name.
///
/// Bare semantic versions gain the `v` prefix used by the release tags
/// (`1.0.0-beta.3` becomes `v1.0.0-beta.3`); anything else is kept as is.
pub fn normalize_version_tag(version: &str) -> String {
    let version = version.trim();
    match Version::parse(version) {
        Ok(_) => format!("v{}", version),
        Err(_) => version.to_string(),
    }
}

/// Bind version overrides onto the distinguished entries.
///
/// An override becomes the entry's tag and clears any commit pin, so the
/// override is what the reconciler compares against.
pub fn apply_overrides(mut pins: Vec<RepositoryPin>, overrides: &VersionOverrides) -> Vec<RepositoryPin> {
    let bindings = [
        (CORE_REPOSITORY, overrides.core.as_deref()),
        (AZTEC_REPOSITORY, overrides.aztec.as_deref()),
    ];

    for (name, version) in bindings {
        let Some(version) = version.map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };
        if let Some(pin) = pins.iter_mut().find(|p| p.name == name) {
            let tag = normalize_version_tag(version);
            debug!("pinning {} to tag {}", name, tag);
            pin.tag = Some(tag);
            pin.commit = None;
        }
    }

    pins
}

/// Parse and validate a YAML pin table.
pub fn parse(yaml: &str) -> Result<Vec<RepositoryPin>> {
    let pins: Vec<RepositoryPin> = serde_yaml::from_str(yaml)?;
    validate(&pins)?;
    Ok(pins)
}

/// Load and validate a YAML pin table from disk.
pub fn from_file(path: &Path) -> Result<Vec<RepositoryPin>> {
    let yaml = std::fs::read_to_string(path)?;
    parse(&yaml).map_err(|e| match e {
        Error::Config { message, hint } => Error::Config {
            message: format!("{}: {}", path.display(), message),
            hint,
        },
        other => other,
    })
}

/// Check names are unique directory names and URLs are well-formed.
pub fn validate(pins: &[RepositoryPin]) -> Result<()> {
    let mut seen = HashSet::new();
    for pin in pins {
        let name = pin.name.as_str();
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.starts_with('.')
            || name.contains(['/', '\\'])
        {
            return Err(Error::Config {
                message: format!("Invalid repository name '{}'", name),
                hint: Some("Names become directory names: no slashes, no leading dot".to_string()),
            });
        }
        if !seen.insert(name) {
            return Err(Error::config(format!("Duplicate repository name '{}'", name)));
        }
        validate_url(&pin.url)?;
        if let Some(paths) = &pin.sparse_paths {
            if paths.iter().any(|p| p.trim().is_empty()) {
                return Err(Error::config(format!("Empty sparse path in '{}'", name)));
            }
        }
    }
    Ok(())
}

/// Accept URLs git understands: anything with a scheme, or scp-like
/// `user@host:path`.
fn validate_url(raw: &str) -> Result<()> {
    let scp_like = raw
        .split_once(':')
        .map(|(host, path)| host.contains('@') && !host.contains('/') && !path.is_empty())
        .unwrap_or(false);
    if scp_like {
        return Ok(());
    }
    url::Url::parse(raw)?;
    Ok(())
}

/// Pins in `category`, in table order.
pub fn in_category(pins: &[RepositoryPin], category: Category) -> Vec<&RepositoryPin> {
    pins.iter().filter(|p| p.category == category).collect()
}
