//! Log filename normalization.
//!
//! Variance logs are named after the run settings that produced them, encoded
//! as `key:value|key:value.csv`. Older experiment builds wrote the algorithm
//! under `mode`; this module rewrites those names so the algorithm is stored
//! under `algorithm` like newer logs.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::LogConfig;

/// Separator between settings in a file stem.
const SETTING_SEPARATOR: &str = "|";

/// Separator between a setting key and its value.
const VALUE_SEPARATOR: char = ':';

/// Errors that can occur during renaming operations.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed setting '{token}' in file name '{name}'")]
    MalformedSetting { name: String, token: String },
}

/// Result type for renaming operations.
pub type Result<T> = std::result::Result<T, RenameError>;

/// Ordered run settings decoded from a log file stem.
///
/// Keys are unique. Setting an existing key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingList {
    entries: Vec<(String, String)>,
}

impl SettingList {
    /// Decode a `key:value|key:value` stem.
    ///
    /// Only the first `:` of a token separates key from value. A repeated key
    /// keeps its first position and takes the last value.
    pub fn parse(stem: &str) -> Result<Self> {
        let mut settings = Self::default();
        for token in stem.split(SETTING_SEPARATOR) {
            let (key, value) =
                token
                    .split_once(VALUE_SEPARATOR)
                    .ok_or_else(|| RenameError::MalformedSetting {
                        name: stem.to_string(),
                        token: token.to_string(),
                    })?;
            settings.insert(key, value);
        }
        Ok(settings)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` to `value`, overwriting in place or appending.
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Move the value of `from` to `to`.
    ///
    /// Returns `false` if `from` is absent.
    pub fn rename_key(&mut self, from: &str, to: &str) -> bool {
        match self.remove(from) {
            Some(value) => {
                self.insert(to, &value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode back to a `key:value|key:value` stem.
    pub fn encode(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{k}{VALUE_SEPARATOR}{v}"))
            .collect::<Vec<_>>()
            .join(SETTING_SEPARATOR)
    }
}

/// A pending rename of one log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Compute the normalized file name for a log file.
///
/// Returns `Ok(None)` if the file is not a log file or already normalized.
pub fn normalized_name(file_name: &str, config: &LogConfig) -> Result<Option<String>> {
    let Some((stem, extension)) = file_name.rsplit_once('.') else {
        return Ok(None);
    };
    if !extension.eq_ignore_ascii_case(&config.extension) {
        return Ok(None);
    }

    let mut settings = SettingList::parse(stem)?;
    if !settings.rename_key(&config.legacy_key, &config.key) {
        return Ok(None);
    }

    let renamed = format!("{}.{}", settings.encode(), extension);
    if renamed == file_name {
        Ok(None)
    } else {
        Ok(Some(renamed))
    }
}

/// List immediate subdirectories of `root`, sorted.
fn list_subdirectories(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RenameError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| RenameError::ReadDir {
            path: root.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();

    dirs.sort();
    Ok(dirs)
}

/// Plan renames for every log file one level below `root`.
///
/// Files directly inside `root` are ignored. Undecodable names are logged and
/// skipped.
pub fn plan_renames(root: &Path, config: &LogConfig) -> Result<Vec<RenamePlan>> {
    let mut plans = Vec::new();

    for dir in list_subdirectories(root)? {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping non UTF-8 file name: {}", path.display());
                continue;
            };

            match normalized_name(file_name, config) {
                Ok(Some(new_name)) => plans.push(RenamePlan {
                    to: dir.join(new_name),
                    from: path,
                }),
                Ok(None) => debug!("Unchanged: {}", path.display()),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }

    Ok(plans)
}

/// Rename log files one level below `root` so `legacy_key` becomes `key`.
///
/// A rename is refused if its target already exists or another file in the
/// same pass already claimed it, so no log is ever overwritten.
///
/// # Returns
///
/// The renames performed (or that would be performed if `dry_run` is true).
pub fn rename_logs(root: &Path, config: &LogConfig, dry_run: bool) -> Result<Vec<RenamePlan>> {
    let plans = plan_renames(root, config)?;
    let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(plans.len());
    let mut done = Vec::with_capacity(plans.len());

    for plan in plans {
        if plan.to.exists() || claimed.contains(&plan.to) {
            warn!(
                "Refusing to rename {}: {} already exists",
                plan.from.display(),
                plan.to.display()
            );
            continue;
        }

        if dry_run {
            println!("Would rename: {} -> {}", plan.from.display(), plan.to.display());
        } else if let Err(e) = fs::rename(&plan.from, &plan.to) {
            warn!("Failed to rename {}: {}", plan.from.display(), e);
            continue;
        } else {
            info!("Renamed: {} -> {}", plan.from.display(), plan.to.display());
        }

        claimed.insert(plan.to.clone());
        done.push(plan);
    }

    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_log(dir: &Path, name: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Frame,Variance").unwrap();
        writeln!(file, "0,1.5").unwrap();
        path
    }

    #[test]
    fn test_parse_and_encode() {
        let settings = SettingList::parse("mode:KM|k:8|size:512").unwrap();
        assert_eq!(settings.len(), 3);
        assert_eq!(settings.get("k"), Some("8"));
        assert_eq!(settings.encode(), "mode:KM|k:8|size:512");
    }

    #[test]
    fn test_parse_value_with_colon() {
        let settings = SettingList::parse("time:12:30").unwrap();
        assert_eq!(settings.get("time"), Some("12:30"));
    }

    #[test]
    fn test_parse_duplicate_key_keeps_position() {
        let settings = SettingList::parse("a:1|b:2|a:3").unwrap();
        assert_eq!(settings.encode(), "a:3|b:2");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            SettingList::parse("mode:KM|broken"),
            Err(RenameError::MalformedSetting { .. })
        ));
        assert!(SettingList::parse("").is_err());
    }

    #[test]
    fn test_rename_key_appends() {
        let mut settings = SettingList::parse("mode:KM|k:8").unwrap();
        assert!(settings.rename_key("mode", "algorithm"));
        assert_eq!(settings.encode(), "k:8|algorithm:KM");
        assert!(!settings.rename_key("mode", "algorithm"));
    }

    #[test]
    fn test_rename_key_overwrites_existing_in_place() {
        let mut settings = SettingList::parse("algorithm:old|k:8|mode:RS").unwrap();
        assert!(settings.rename_key("mode", "algorithm"));
        assert_eq!(settings.encode(), "algorithm:RS|k:8");
    }

    #[test]
    fn test_normalized_name() {
        let config = LogConfig::default();
        assert_eq!(
            normalized_name("mode:KHM|k:4|lr:0.5.csv", &config).unwrap(),
            Some("k:4|lr:0.5|algorithm:KHM.csv".to_string())
        );
        assert_eq!(normalized_name("algorithm:KM|k:4.csv", &config).unwrap(), None);
        assert_eq!(normalized_name("mode:KM.txt", &config).unwrap(), None);
        assert_eq!(normalized_name("README", &config).unwrap(), None);
        assert_eq!(
            normalized_name("mode:KM.CSV", &config).unwrap(),
            Some("algorithm:KM.CSV".to_string())
        );
    }

    #[test]
    fn test_rename_logs() {
        let temp_dir = TempDir::new().unwrap();
        let run = temp_dir.path().join("1. subsampling");
        create_log(&run, "mode:KM|k:8.csv");
        create_log(&run, "algorithm:RS|k:8.csv");
        create_log(&run, "mode:KM|k:8.txt");
        create_log(temp_dir.path(), "mode:KM|k:16.csv");

        let renamed = rename_logs(temp_dir.path(), &LogConfig::default(), false).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(run.join("k:8|algorithm:KM.csv").exists());
        assert!(!run.join("mode:KM|k:8.csv").exists());
        assert!(run.join("algorithm:RS|k:8.csv").exists());
        assert!(run.join("mode:KM|k:8.txt").exists());
        // Files at the root level are left alone
        assert!(temp_dir.path().join("mode:KM|k:16.csv").exists());
    }

    #[test]
    fn test_rename_logs_dry_run() {
        let temp_dir = TempDir::new().unwrap();
        let run = temp_dir.path().join("run");
        let original = create_log(&run, "mode:KM|k:8.csv");

        let renamed = rename_logs(temp_dir.path(), &LogConfig::default(), true).unwrap();

        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed[0].to, run.join("k:8|algorithm:KM.csv"));
        assert!(original.exists());
        assert!(!run.join("k:8|algorithm:KM.csv").exists());
    }

    #[test]
    fn test_rename_logs_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let run = temp_dir.path().join("run");
        let legacy = create_log(&run, "mode:KM|k:8.csv");
        let existing = run.join("k:8|algorithm:KM.csv");
        fs::write(&existing, "keep me\n").unwrap();

        let renamed = rename_logs(temp_dir.path(), &LogConfig::default(), false).unwrap();

        assert!(renamed.is_empty());
        assert!(legacy.exists());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me\n");
    }

    #[test]
    fn test_rename_logs_skips_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let run = temp_dir.path().join("run");
        let broken = create_log(&run, "mode:KM|oops.csv");
        create_log(&run, "mode:RS.csv");

        let renamed = rename_logs(temp_dir.path(), &LogConfig::default(), false).unwrap();

        assert_eq!(renamed.len(), 1);
        assert!(broken.exists());
        assert!(run.join("algorithm:RS.csv").exists());
    }

    #[test]
    fn test_rename_logs_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = rename_logs(&temp_dir.path().join("nope"), &LogConfig::default(), true);
        assert!(matches!(result, Err(RenameError::DirectoryNotFound(_))));
    }
}
