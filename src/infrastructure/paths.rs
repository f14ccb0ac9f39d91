//! Path utilities for locating moodlog's data.
//!
//! The default data directory is the platform's local data directory for the
//! application (for example `~/.local/share/moodlog` on Linux). Paths from
//! configuration may start with `~`, which expands to the user's home.

use std::path::PathBuf;

use crate::domain::error::{MoodlogError, Result};

/// File name of the optional configuration file inside the data directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// File name of the trace export inside the data directory.
pub const TRACE_FILENAME: &str = "moodlog-otlp.json";

/// Returns the default data directory for moodlog storage.
///
/// # Errors
///
/// Returns [`MoodlogError::Config`] if no home directory can be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("app", "moodlog", "moodlog")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .ok_or_else(|| MoodlogError::Config("could not determine a data directory".to_string()))
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and every path when no home directory is
/// known, are returned unchanged.
///
/// # Examples
///
/// ```
/// use moodlog::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());

    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}
