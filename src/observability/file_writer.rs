//! Size-rotated line writer for the trace export file.
//!
//! Once the file passes [`MAX_FILE_SIZE_BYTES`] it is renamed to
//! `<stem>.<unix-millis>.json` and a fresh file is started. Rotations within
//! the same millisecond get a `-<n>` suffix so no backup is overwritten. Only
//! the newest [`MAX_BACKUP_FILES`] rotated files are kept.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Maximum file size before rotation (10 MB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of rotated files to retain.
const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe appending writer with size-based rotation.
///
/// The file is opened lazily on the first write, so constructing a writer for
/// a path that cannot be created yet still succeeds.
pub struct FileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    file: Mutex<Option<fs::File>>,
}

impl FileWriter {
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_limit(file_path, MAX_FILE_SIZE_BYTES)
    }

    /// Writer that rotates after `max_bytes` instead of the default limit.
    pub const fn with_limit(file_path: PathBuf, max_bytes: u64) -> Self {
        Self {
            file_path,
            max_bytes,
            file: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the file is full.
    ///
    /// # Errors
    ///
    /// Returns an error if rotation, opening, writing, or flushing fails, or if
    /// the internal lock was poisoned.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("writer lock poisoned: {e}")))?;

        let full = fs::metadata(&self.file_path).is_ok_and(|m| m.len() > self.max_bytes);
        if full {
            *file = None;
            self.rotate()?;
        }

        let handle = match file.take() {
            Some(handle) => handle,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?,
        };
        let handle = file.insert(handle);

        writeln!(handle, "{line}")?;
        handle.flush()
    }

    fn rotate(&self) -> io::Result<()> {
        let stem = self.stem()?;
        if self.file_path.exists() {
            fs::rename(&self.file_path, self.backup_path(&stem))?;
        }
        self.prune_backups(&stem)
    }

    /// First unused `<stem>.<millis>[-n].json` name next to the trace file.
    fn backup_path(&self, stem: &str) -> PathBuf {
        let stamp = chrono::Utc::now().timestamp_millis();
        let mut candidate = self.file_path.with_file_name(format!("{stem}.{stamp}.json"));
        let mut n = 1u32;
        while candidate.exists() {
            candidate = self
                .file_path
                .with_file_name(format!("{stem}.{stamp}-{n}.json"));
            n += 1;
        }
        candidate
    }

    /// Deletes rotated files beyond the retention limit, oldest first.
    ///
    /// Individual delete failures are ignored so one stuck file does not stop
    /// tracing.
    fn prune_backups(&self, stem: &str) -> io::Result<()> {
        let dir = self.file_path.parent().unwrap_or_else(|| Path::new("."));
        let prefix = format!("{stem}.");
        let current = self.file_path.file_name();

        let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.file_name() != current)
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            })
            .collect();

        backups.sort_by_key(|path| std::cmp::Reverse(fs::metadata(path).and_then(|m| m.modified()).ok()));

        for stale in backups.iter().skip(MAX_BACKUP_FILES) {
            let _ = fs::remove_file(stale);
        }
        Ok(())
    }

    fn stem(&self) -> io::Result<String> {
        self.file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "trace file has no name"))
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}
