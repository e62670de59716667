//! PersistConfigUseCase: one atomic save cycle per trigger.
//!
//! This use case sits at the application layer and delegates all file
//! mechanics to a [`ConfigStore`] trait object.  The production store
//! (temporary file plus atomic rename) lives in the infrastructure layer.
//!
//! # The per-cycle state machine
//!
//! ```text
//! Idle ─ begin() ─▶ Creating ─ header ─▶ HeaderWritten
//!                                             │ enumerate dirty set
//!                                             ▼
//!                                        Enumerating ─▶ Finalizing ─▶ Committed
//!                                             │                          ▲
//!                                             └── any I/O failure ───────┘
//!                                                        ▼
//!                                                     Aborted
//! ```
//!
//! The states are not reified as an enum — they fall directly out of the
//! strictly ordered call sequence in [`PersistConfigUseCase::run_cycle`].
//! What matters is the terminal-state contract: `Committed` means the
//! canonical file now holds the complete new snapshot; `Aborted` means it
//! is byte-for-byte whatever it was before the cycle began.  Either way
//! control returns to the listener's `Idle` wait.
//!
//! # Per-record vs. per-cycle failures
//!
//! A record whose value cannot be rendered as text (an opaque blob) is
//! skipped with a diagnostic naming the variable — one bad variable must
//! not abort the whole save.  An I/O failure on the session, or a registry
//! failure mid-enumeration, aborts the cycle: the session is dropped
//! uncommitted and the canonical file stays untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use varsave_core::{config_line, CONFIG_HEADER};

use super::registry::{RegistryError, VariableRegistry};

/// Error type for configuration storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session's temporary file could not be created.
    #[error("cannot create {}: {}", path.display(), source)]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A write to the session's temporary file failed.
    #[error("write to {} failed: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temporary file could not be published over the canonical path.
    #[error("cannot publish {}: {}", path.display(), source)]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catch-all for non-I/O store failures (used by test doubles).
    #[error("storage failure: {0}")]
    Other(String),
}

/// One ephemeral output session, scoped to a single persistence cycle.
///
/// A session is created in `Creating`, receives the header and body writes,
/// and is either consumed by [`ConfigSession::commit`] (publishing the new
/// snapshot atomically) or dropped (aborting with the canonical file
/// untouched).  Sessions never outlive a cycle and are never concurrent —
/// the listener does not start the next wait until the current session
/// reaches a terminal state.
pub trait ConfigSession: Send {
    /// Appends `text` to the in-flight snapshot.
    fn write_text(&mut self, text: &str) -> Result<(), StorageError>;

    /// Finalizes the snapshot and publishes it as the canonical file.
    /// Consumes the session; there is nothing meaningful to do with one
    /// after commit, successful or not.
    fn commit(self: Box<Self>) -> Result<(), StorageError>;
}

/// Factory port for per-cycle output sessions.
pub trait ConfigStore: Send + Sync {
    /// The canonical path this store publishes to.
    fn target(&self) -> &Path;

    /// Opens a fresh session.  Implementations must guarantee that a
    /// failure here, or at any later point before `commit` returns `Ok`,
    /// leaves the canonical file untouched.
    fn begin(&self) -> Result<Box<dyn ConfigSession>, StorageError>;
}

/// Error type for a whole persistence cycle.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Summary of one committed cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Variables written to the file.
    pub saved: usize,
    /// Variables skipped because their value had no textual form.
    pub skipped: usize,
}

/// The Persist Config use case.
///
/// Holds the store port; the registry is passed per cycle because the
/// listener owns it between cycles.
pub struct PersistConfigUseCase {
    store: Arc<dyn ConfigStore>,
}

impl PersistConfigUseCase {
    /// Creates a new use case writing through the given store.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// The canonical path cycles publish to.  Used by callers for
    /// diagnostics naming the configured file.
    pub fn target(&self) -> &Path {
        self.store.target()
    }

    /// Runs one complete persistence cycle.
    ///
    /// Strictly ordered: open session, write header, stream the dirty-set
    /// cursor through the line formatter, commit.  Unconvertible records
    /// are skipped with a warning; everything else short-circuits with `?`
    /// and aborts the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] when the session cannot be created or
    /// written, the registry cursor fails, or the final publish fails.  In
    /// every error case the canonical file is unchanged from before the
    /// cycle; a temporary file may remain for diagnosis.
    pub async fn run_cycle(
        &self,
        registry: &mut dyn VariableRegistry,
    ) -> Result<CycleReport, PersistError> {
        let mut session = self.store.begin()?;
        session.write_text(CONFIG_HEADER)?;

        let mut report = CycleReport::default();
        let mut cursor = registry.first_dirty().await?;
        while let Some(record) = cursor {
            match config_line(&record) {
                Ok(line) => {
                    session.write_text(&line)?;
                    report.saved += 1;
                }
                Err(e) => {
                    // One bad variable must not abort the whole save.
                    warn!("cannot save {}: {e}", record.name);
                    report.skipped += 1;
                }
            }
            cursor = registry.next_dirty().await?;
        }

        session.commit()?;
        debug!(
            "configuration committed to {}: {} saved, {} skipped",
            self.store.target().display(),
            report.saved,
            report.skipped
        );
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
