//! Diagnostic extraction from Rolldown errors.
//!
//! Rolldown reports failures as batched diagnostics whose structure is not
//! part of its stable API. This module flattens them into cloneable,
//! serializable [`ExtractedDiagnostic`]s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from Rolldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub help: Option<String>,
}

/// Diagnostic kind (mirrors Rolldown's EventKind).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingExport,
    ParseError,
    CircularDependency,
    UnresolvedEntry,
    UnresolvedImport,
    Plugin,
    Other(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingExport => write!(f, "MissingExport"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::CircularDependency => write!(f, "CircularDependency"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::Plugin => write!(f, "Plugin"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Diagnostic for failures raised by strata itself rather than Rolldown,
/// such as a panicked build task.
pub fn internal(kind: &str, message: impl Into<String>) -> ExtractedDiagnostic {
    ExtractedDiagnostic {
        kind: DiagnosticKind::Other(kind.to_string()),
        severity: DiagnosticSeverity::Error,
        message: message.into(),
        file: None,
        help: None,
    }
}

/// Extract diagnostics from Rolldown error types.
///
/// Parses the debug rendering, since Rolldown does not expose a stable
/// structured accessor.
pub fn extract_from_rolldown_error(error: &dyn fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    let parts: Vec<&str> = error_str
        .split("BatchedBuildDiagnostic")
        .filter(|s| !s.trim().is_empty())
        .collect();

    if parts.len() > 1 {
        parts.iter().map(|part| extract_single(part)).collect()
    } else {
        vec![extract_single(&error_str)]
    }
}

fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let kind = if error_str.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("ParseError")
        || error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("Circular") || error_str.contains("cycle") {
        DiagnosticKind::CircularDependency
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Cannot resolve") {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("Plugin") {
        DiagnosticKind::Plugin
    } else {
        DiagnosticKind::Other("BuildError".to_string())
    };

    let severity = if error_str.contains("Warning") || error_str.contains("warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        help: extract_help_text(error_str),
    }
}

/// Extract file path from error message.
fn extract_file_path(text: &str) -> Option<String> {
    for ext in &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"] {
        let Some(pos) = text.find(ext) else {
            continue;
        };
        let before = &text[..pos + ext.len()];
        for indicator in &["in ", "at ", "file: ", "path: ", "\"", "'"] {
            if let Some(start) = before.rfind(indicator) {
                let path_str = before[start + indicator.len()..].trim_start_matches(['"', '\'']);
                let end = path_str
                    .find([' ', '\n', '"', '\'', ','])
                    .unwrap_or(path_str.len());
                return Some(path_str[..end].trim().to_string());
            }
        }
    }
    None
}

/// Extract help text from error message.
fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let help = text[pos + indicator.len()..]
                .lines()
                .next()
                .unwrap_or("")
                .trim();
            if !help.is_empty() {
                return Some(help.to_string());
            }
        }
    }
    None
}
