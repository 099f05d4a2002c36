//! Log maintenance passes over experiment output directories.

pub mod renaming;
pub mod trimming;

// Re-export key types for convenience
pub use renaming::{normalized_name, plan_renames, rename_logs, RenameError, RenamePlan, SettingList};
pub use trimming::{find_cut, trim_directory, trim_file, TrimError, TrimReport};
