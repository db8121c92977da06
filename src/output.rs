//! # Output Configuration
//!
//! Controls the appearance of user-facing progress lines: whether emoji and
//! color are used, and whether per-target lines are printed at all.
//!
//! Color handling honors the usual conventions:
//! - `--color=never|always|auto` CLI flag
//! - `NO_COLOR` disables colors when present (<https://no-color.org/>)
//! - `CLICOLOR=0` disables colors
//! - `CLICOLOR_FORCE=1` forces colors even without a TTY
//! - `TERM=dumb` disables colors
//!
//! `--quiet` drops progress lines entirely; errors still reach stderr.

use std::env;

/// How user-facing output should be rendered.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether emoji and color may be used.
    pub use_color: bool,
    /// Whether per-target progress lines are suppressed.
    pub quiet: bool,
}

impl OutputConfig {
    /// Build from the `--color` flag value, the environment, and `--quiet`.
    ///
    /// `--color=always` forces color on even under `NO_COLOR`;
    /// `--color=never` forces it off; anything else consults the
    /// environment and the terminal.
    pub fn new(color_flag: &str, quiet: bool) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self { use_color, quiet }
    }

    /// Pick the emoji or its plain-text stand-in.
    pub fn emoji<'a>(&self, emoji: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji
        } else {
            plain
        }
    }

    /// Colors off, progress lines on.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            use_color: false,
            quiet: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new("auto", false)
    }
}

/// Environment-based color detection, in conventional precedence order.
fn detect_color_support() -> bool {
    // NO_COLOR wins when present, even when empty.
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}
