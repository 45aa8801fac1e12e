//! Timestamped artifact files that are never overwritten.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::OutputError;

/// Highest numeric suffix tried before giving up on a unique name.
const MAX_SUFFIX: u32 = 999;

/// `YYYYMMDD_HHMMSS`, the stamp embedded in every artifact name.
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Create `<dir>/<prefix>_<stamp>.<ext>`, or `<prefix>_<stamp>_<n>.<ext>`
/// when that name is taken. The directory is created if missing.
pub(crate) fn create_unique(
    dir: &Path,
    prefix: &str,
    at: DateTime<Utc>,
    ext: &str,
) -> Result<(PathBuf, File), OutputError> {
    std::fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;

    let stamp = timestamp(at);
    for n in 0..=MAX_SUFFIX {
        let name = if n == 0 {
            format!("{prefix}_{stamp}.{ext}")
        } else {
            format!("{prefix}_{stamp}_{n}.{ext}")
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(OutputError::io(&path, e)),
        }
    }
    Err(OutputError::io(
        dir,
        std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free {prefix}_{stamp} name"),
        ),
    ))
}

/// Newest `<prefix>_*.<ext>` in `dir` by file name.
///
/// # Errors
///
/// Returns [`OutputError::Io`] if `dir` exists but cannot be listed.
pub fn latest_artifact(dir: &Path, prefix: &str, ext: &str) -> Result<Option<PathBuf>, OutputError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(OutputError::io(dir, e)),
    };

    let head = format!("{prefix}_");
    let tail = format!(".{ext}");
    let mut newest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| OutputError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(&head) || !name.ends_with(&tail) {
            continue;
        }
        if newest.as_ref().map_or(true, |(best, _)| name > *best) {
            newest = Some((name, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}
