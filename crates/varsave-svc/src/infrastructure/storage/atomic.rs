//! Temporary-file-plus-rename implementation of the config store port.
//!
//! # Why write-then-rename? (for beginners)
//!
//! Writing the canonical file in place would leave a truncated or
//! half-written file on disk if the daemon crashed (or the machine lost
//! power) mid-write — and the load utility would read garbage at the next
//! boot.  Instead, each cycle writes the complete new snapshot to a
//! sibling temporary file and then publishes it with `rename(2)`.  On a
//! POSIX filesystem a same-directory rename is atomic: any reader sees
//! either the old complete file or the new complete file, never a mix.
//!
//! The same mechanism covers the temporary file itself: a crash can leave
//! a stale `.tmp` behind, so every session starts by unlinking it before
//! creating a fresh one.
//!
//! # Failure contract
//!
//! Any failure before the rename leaves the canonical file untouched.  A
//! failed session deliberately does *not* clean up its temporary file —
//! it is left in place for diagnosis and overwritten by the next cycle.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::application::persist::{ConfigSession, ConfigStore, StorageError};

/// Suffix appended to the target path to form the temporary path.
const TMP_SUFFIX: &str = ".tmp";

/// File-backed [`ConfigStore`] publishing to a fixed canonical path.
pub struct AtomicConfigFile {
    target: PathBuf,
}

impl AtomicConfigFile {
    /// Creates a store publishing to `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The sibling temporary path: the target path with [`TMP_SUFFIX`]
    /// appended.  Same directory as the target, so the final rename never
    /// crosses a filesystem boundary.
    fn tmp_path(&self) -> PathBuf {
        let mut path = self.target.as_os_str().to_os_string();
        path.push(TMP_SUFFIX);
        PathBuf::from(path)
    }
}

impl ConfigStore for AtomicConfigFile {
    fn target(&self) -> &Path {
        &self.target
    }

    fn begin(&self) -> Result<Box<dyn ConfigSession>, StorageError> {
        let tmp = self.tmp_path();

        // A crash mid-cycle can leave a stale temporary file behind.
        // Missing is the normal case; any other unlink failure is worth a
        // diagnostic but not an abort — the create below decides.
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("cannot remove stale {}: {e}", tmp.display()),
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let file = options.open(&tmp).map_err(|source| StorageError::Create {
            path: tmp.clone(),
            source,
        })?;

        Ok(Box::new(AtomicFileSession {
            target: self.target.clone(),
            tmp,
            writer: BufWriter::new(file),
        }))
    }
}

/// One in-flight snapshot: an open buffered handle on the temporary file.
struct AtomicFileSession {
    target: PathBuf,
    tmp: PathBuf,
    writer: BufWriter<File>,
}

impl ConfigSession for AtomicFileSession {
    fn write_text(&mut self, text: &str) -> Result<(), StorageError> {
        self.writer
            .write_all(text.as_bytes())
            .map_err(|source| StorageError::Write {
                path: self.tmp.clone(),
                source,
            })
    }

    fn commit(self: Box<Self>) -> Result<(), StorageError> {
        let AtomicFileSession {
            target,
            tmp,
            mut writer,
        } = *self;

        // Flush and close the handle before publishing, so the rename only
        // ever exposes a fully written file.
        writer.flush().map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        drop(writer);

        std::fs::rename(&tmp, &target).map_err(|source| StorageError::Commit {
            path: target.clone(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
