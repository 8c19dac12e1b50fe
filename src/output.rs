//! # Output Configuration
//!
//! Controls how the CLI decorates its output: status markers, colors and the
//! sync spinner. Decoration depends on terminal capabilities and user
//! preferences.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use noir_mirror::output::{OutputConfig, emoji};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} noir synced", emoji(&config, "✅", "[OK]"));
//! ```

use std::env;

use console::{style, StyledObject};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` forces colors on (overriding `NO_COLOR`),
    /// `--color=never` forces them off, and `auto` detects support from the
    /// environment and whether stdout is a terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Whether an animated spinner may be drawn on stderr.
    pub fn show_progress(&self) -> bool {
        self.use_color && console::Term::stderr().is_term()
    }

    /// Style `text` as a repository or file name.
    pub fn name<'a>(&self, text: &'a str) -> StyledObject<&'a str> {
        style(text).bold().force_styling(self.use_color)
    }

    /// Style `text` as secondary detail.
    pub fn dim<'a>(&self, text: &'a str) -> StyledObject<&'a str> {
        style(text).dim().force_styling(self.use_color)
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, otherwise the plain text
/// alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Marker for a finished repository or search line.
pub fn status_marker(config: &OutputConfig, ok: bool) -> &'static str {
    if ok {
        emoji(config, "✅", "[OK]")
    } else {
        emoji(config, "❌", "[ERR]")
    }
}
