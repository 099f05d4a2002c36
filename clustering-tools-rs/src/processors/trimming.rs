//! Variance log truncation.
//!
//! Some experiment runs appended a second `Frame,Variance` table to a log that
//! already held one. Trimming keeps the header and every line before the
//! repeated marker, and drops the rest.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

/// Errors that can occur during trimming operations.
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read log {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for trimming operations.
pub type Result<T> = std::result::Result<T, TrimError>;

/// Outcome of trimming one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimReport {
    pub path: PathBuf,
    pub kept_lines: usize,
    pub dropped_lines: usize,
}

/// Locate the cut point in `content`.
///
/// Line 0 is always kept. Returns the byte offset of the first later line
/// equal to `marker` (line terminators ignored) and the number of lines kept,
/// or `None` if no such line exists.
pub fn find_cut(content: &str, marker: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for (idx, line) in content.split_inclusive('\n').enumerate() {
        if idx > 0 && line.trim_end_matches(['\r', '\n']) == marker {
            return Some((offset, idx));
        }
        offset += line.len();
    }
    None
}

/// Trim a single log at `marker`.
///
/// Returns `Ok(None)` if the file has no marker after its header and was left
/// untouched.
pub fn trim_file(path: &Path, marker: &str, dry_run: bool) -> Result<Option<TrimReport>> {
    let content = fs::read_to_string(path).map_err(|e| TrimError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let Some((cut, kept_lines)) = find_cut(&content, marker) else {
        return Ok(None);
    };

    let dropped_lines = content[cut..].split_inclusive('\n').count();

    if !dry_run {
        fs::write(path, &content[..cut]).map_err(|e| TrimError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(Some(TrimReport {
        path: path.to_path_buf(),
        kept_lines,
        dropped_lines,
    }))
}

/// Trim every regular file directly inside `dir`.
///
/// Per-file failures are logged and skipped.
///
/// # Returns
///
/// Reports for the files that were trimmed (or would be if `dry_run` is true).
pub fn trim_directory(dir: &Path, marker: &str, dry_run: bool) -> Result<Vec<TrimReport>> {
    if !dir.is_dir() {
        return Err(TrimError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| TrimError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    files.sort();

    let action = if dry_run { "Would trim" } else { "Trimmed" };
    let mut reports = Vec::with_capacity(files.len());

    for path in files {
        match trim_file(&path, marker, dry_run) {
            Ok(Some(report)) => {
                info!(
                    "{} {}: kept {} lines, dropped {}",
                    action,
                    path.display(),
                    report.kept_lines,
                    report.dropped_lines
                );
                reports.push(report);
            }
            Ok(None) => debug!("No marker in {}", path.display()),
            Err(e) => warn!("Skipping {}", e),
        }
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MARKER: &str = "Frame,Variance";

    #[test]
    fn test_find_cut() {
        let content = "Frame,Variance\n0,1.0\n1,0.5\nFrame,Variance\n0,9.9\n";
        assert_eq!(find_cut(content, MARKER), Some((27, 3)));
        assert_eq!(&content[..27], "Frame,Variance\n0,1.0\n1,0.5\n");
    }

    #[test]
    fn test_find_cut_ignores_header() {
        assert_eq!(find_cut("Frame,Variance\n0,1.0\n", MARKER), None);
    }

    #[test]
    fn test_find_cut_crlf() {
        let content = "Frame,Variance\r\n0,1.0\r\nFrame,Variance\r\n";
        assert_eq!(find_cut(content, MARKER), Some((23, 2)));
    }

    #[test]
    fn test_find_cut_empty() {
        assert_eq!(find_cut("", MARKER), None);
    }

    #[test]
    fn test_trim_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.csv");
        fs::write(&path, "Frame,Variance\n0,1.0\nFrame,Variance\n0,2.0\n1,3.0\n").unwrap();

        let report = trim_file(&path, MARKER, false).unwrap().unwrap();

        assert_eq!(report.kept_lines, 2);
        assert_eq!(report.dropped_lines, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Frame,Variance\n0,1.0\n");
    }

    #[test]
    fn test_trim_file_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.csv");
        let content = "Frame,Variance\n0,1.0\nFrame,Variance\n";
        fs::write(&path, content).unwrap();

        let report = trim_file(&path, MARKER, true).unwrap().unwrap();

        assert_eq!(report.dropped_lines, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_trim_file_without_marker_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.csv");
        fs::write(&path, "Frame,Variance\n0,1.0").unwrap();

        assert_eq!(trim_file(&path, MARKER, false).unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Frame,Variance\n0,1.0");
    }

    #[test]
    fn test_trim_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.csv"), "h\n1\nFrame,Variance\n2\n").unwrap();
        fs::write(temp_dir.path().join("b.csv"), "h\n1\n").unwrap();
        fs::write(temp_dir.path().join("empty.csv"), "").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/c.csv"), "h\nFrame,Variance\n").unwrap();

        let reports = trim_directory(temp_dir.path(), MARKER, false).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, temp_dir.path().join("a.csv"));
        assert_eq!(fs::read_to_string(temp_dir.path().join("a.csv")).unwrap(), "h\n1\n");
        assert_eq!(fs::read_to_string(temp_dir.path().join("b.csv")).unwrap(), "h\n1\n");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("nested/c.csv")).unwrap(),
            "h\nFrame,Variance\n"
        );
    }

    #[test]
    fn test_trim_directory_skips_binary() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(temp_dir.path().join("log.csv"), "h\nFrame,Variance\n").unwrap();

        let reports = trim_directory(temp_dir.path(), MARKER, false).unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_trim_directory_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = trim_directory(&temp_dir.path().join("missing"), MARKER, false);
        assert!(matches!(result, Err(TrimError::DirectoryNotFound(_))));
    }
}
