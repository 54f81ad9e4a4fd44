//! Secure, atomic artifact writing.
//!
//! All artifacts of one variant are written together: every file goes to a
//! `.tmp` sibling first and is renamed into place only after all writes
//! succeeded. Output paths are normalised with `path_clean` and must stay
//! inside the output base directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::bundler::{Artifact, OutputFormat};
use crate::{Error, Result};

const SOURCE_MAPPING_PREFIX: &str = "//# sourceMappingURL=";

/// One file written for a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub format: OutputFormat,
    pub path: PathBuf,
    pub sourcemap: Option<PathBuf>,
    pub bytes: usize,
}

/// Write `artifacts` below `base_dir`, atomically.
///
/// Each artifact with a source map gets a `<file>.map` companion, and its
/// `sourceMappingURL` comment is rewritten to point at that companion.
///
/// # Errors
///
/// Returns [`Error::InvalidOutputPath`] if a destination escapes `base_dir`,
/// or [`Error::WriteFailure`] if any write or rename fails. On failure no
/// destination file is replaced.
pub fn write_artifacts(base_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<WrittenFile>> {
    let base_dir = validate_and_normalize_dir(base_dir)?;

    let mut operations: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    let mut written = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let target = validate_output_path(&base_dir, &artifact.file)?;

        let (code, map_path) = match &artifact.map {
            Some(map) => {
                let map_path = sourcemap_path(&target);
                let map_name = map_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                operations.push((map_path.clone(), map.clone().into_bytes()));
                (link_sourcemap(&artifact.code, Some(&map_name)), Some(map_path))
            }
            None => (link_sourcemap(&artifact.code, None), None),
        };

        written.push(WrittenFile {
            format: artifact.format,
            path: target.clone(),
            sourcemap: map_path,
            bytes: code.len(),
        });
        operations.push((target, code.into_bytes()));
    }

    write_files_atomic(&operations)?;

    for file in &written {
        tracing::debug!(path = %file.path.display(), bytes = file.bytes, "wrote artifact");
    }
    Ok(written)
}

/// `<file>.map` next to `target`.
fn sourcemap_path(target: &Path) -> PathBuf {
    with_suffix(target, ".map")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Drop any existing trailing `sourceMappingURL` comment and, if a map is
/// written, append one naming it.
fn link_sourcemap(code: &str, map_name: Option<&str>) -> String {
    let mut body = code.trim_end().to_string();
    if let Some(pos) = body.rfind(SOURCE_MAPPING_PREFIX) {
        let is_last_line = !body[pos..].contains('\n');
        if is_last_line {
            body.truncate(pos);
            body = body.trim_end().to_string();
        }
    }

    body.push('\n');
    if let Some(name) = map_name {
        body.push_str(SOURCE_MAPPING_PREFIX);
        body.push_str(name);
        body.push('\n');
    }
    body
}

/// Normalise the base directory to an absolute, cleaned path.
fn validate_and_normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir().map_err(|e| {
        Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
    })?;
    Ok(cwd.join(&cleaned).clean())
}

/// Validates an output path to prevent directory traversal.
fn validate_output_path(base_dir: &Path, file: &Path) -> Result<PathBuf> {
    let text = file.to_string_lossy();
    if text.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }
    if text.trim().is_empty() {
        return Err(Error::InvalidOutputPath("Filename is empty".to_string()));
    }

    let full_path = base_dir.join(file.clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}' (resolved to '{}')",
            text,
            base_dir.display(),
            full_path.display()
        )));
    }

    Ok(full_path)
}

/// Two-phase write: all temp files first, then renames.
fn write_files_atomic(operations: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let mut temp_files = Vec::with_capacity(operations.len());

    for (target_path, content) in operations {
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                cleanup_temp_files(&temp_files);
                Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = with_suffix(target_path, ".tmp");
        fs::write(&temp_path, content).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp_path.display(),
                e
            ))
        })?;

        temp_files.push((temp_path, target_path.clone()));
    }

    for (temp_path, target_path) in &temp_files {
        fs::rename(temp_path, target_path).map_err(|e| {
            cleanup_temp_files(&temp_files);
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp_path.display(),
                target_path.display(),
                e
            ))
        })?;
    }

    Ok(())
}

/// Best-effort removal of leftover temp files.
fn cleanup_temp_files(temp_files: &[(PathBuf, PathBuf)]) {
    for (temp_path, _) in temp_files {
        if temp_path.exists() {
            if let Err(e) = fs::remove_file(temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    error = %e,
                    "failed to clean up temporary file"
                );
            }
        }
    }
}
