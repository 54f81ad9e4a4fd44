//! Terminal UI utilities for status messages and build summaries.
//!
//! Everything is printed to stderr so stdout stays free for machine-readable
//! output.
//!
//! ```no_run
//! use strata_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Build successful");
//! ui::error("Layer violation in thick-client");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{SummaryRow, format_duration, format_size, print_build_summary, summary_rows};
pub use messages::{error, info, success, warning};

static COLOR: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to terminal
/// detection on stderr.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Decide color support once, early in `main`.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    COLOR.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_flag_disables_color() {
        init_colors(true);
        assert!(!color_enabled());
    }
}
