//! Miette diagnostic conversion for CLI errors.

use ::miette::Report;

use crate::error::CliError;

/// Convert CliError to miette Report
///
/// Bundler errors keep their own `Diagnostic` implementation (code and help
/// text); config errors carry their hint into the rendered message.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        CliError::Config(e) => match e.hint() {
            Some(hint) => ::miette::miette!("Configuration error: {}\n\nHint: {}", e, hint),
            None => ::miette::miette!("Configuration error: {}", e),
        },
        other => ::miette::miette!("{}", other),
    }
}
