//! Formatting utilities for sizes, durations, and the per-variant summary.

use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;
use strata_bundler::BuildReport;

use super::color_enabled;

/// Format file size in human-readable format.
///
/// ```
/// use strata_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format (ms, s, m:s).
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One summary line: variant name, then either its written size or its error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub variant: String,
    pub detail: String,
    pub outcome: Result<String, String>,
}

/// Build the summary rows for `report`, in plan order.
pub fn summary_rows(report: &BuildReport) -> Vec<SummaryRow> {
    report
        .variants
        .iter()
        .map(|variant| {
            let detail = format!(
                "{}, {}, {}",
                variant.mode,
                variant.target,
                format_duration(variant.duration)
            );
            let outcome = match &variant.result {
                Ok(files) => {
                    let bytes: usize = files.iter().map(|f| f.bytes).sum();
                    Ok(format!("{} file(s), {}", files.len(), format_size(bytes as u64)))
                }
                Err(err) => Err(err.to_string()),
            };
            SummaryRow {
                variant: variant.name.clone(),
                detail,
                outcome,
            }
        })
        .collect()
}

/// Print the per-variant build summary to stderr.
pub fn print_build_summary(report: &BuildReport) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let rule = "─".repeat(width);
    let color = color_enabled();

    if color {
        eprintln!("\n{}", "Build Summary".bold().underline());
    } else {
        eprintln!("\nBuild Summary");
    }
    eprintln!("{rule}");

    for row in summary_rows(report) {
        match (&row.outcome, color) {
            (Ok(written), true) => eprintln!(
                "  {} {} {} {}",
                "✓".green(),
                row.variant.bright_white().bold(),
                written.dimmed(),
                format!("({})", row.detail).dimmed()
            ),
            (Err(err), true) => eprintln!(
                "  {} {} {}\n      {}",
                "✗".red(),
                row.variant.bright_white().bold(),
                format!("({})", row.detail).dimmed(),
                err.red()
            ),
            (Ok(written), false) => {
                eprintln!("  ✓ {} {} ({})", row.variant, written, row.detail)
            }
            (Err(err), false) => {
                eprintln!("  ✗ {} ({})\n      {}", row.variant, row.detail, err)
            }
        }
    }

    eprintln!("{rule}");
}
