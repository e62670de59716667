//! TriggerListener: converts the registry's notification stream into save
//! cycles.
//!
//! The listener is the daemon's main loop.  It blocks on the registry's
//! event receive, discards anything that is not a "modified" event on the
//! trigger handle, and invokes the persister synchronously on a match.
//! Because the next receive does not begin until the cycle reaches a
//! terminal state, cycles can never overlap and triggers arriving mid-cycle
//! are coalesced by the registry's event delivery — no explicit mutual
//! exclusion is needed anywhere.
//!
//! Per-cycle failures are reported and swallowed: the daemon goes straight
//! back to waiting, and the next trigger event is the retry.  The only way
//! out of the loop is the event stream ending, which means the registry
//! connection is gone and the daemon cannot continue.

use tracing::{error, info};

use varsave_core::{EventKind, VarHandle};

use super::persist::PersistConfigUseCase;
use super::registry::{RegistryError, VariableRegistry};

/// The Trigger Listener use case.
pub struct TriggerListener {
    /// Handle of the trigger variable, resolved once at startup.
    trigger: VarHandle,
    /// Trigger variable name, kept for log messages only.
    trigger_name: String,
    /// Whether to announce each cycle before it starts.
    verbose: bool,
}

impl TriggerListener {
    /// Creates a listener for the given (already resolved) trigger handle.
    pub fn new(trigger: VarHandle, trigger_name: impl Into<String>, verbose: bool) -> Self {
        Self {
            trigger,
            trigger_name: trigger_name.into(),
            verbose,
        }
    }

    /// Runs the wait → match → persist loop until the event stream ends.
    ///
    /// Under normal operation this never returns: the daemon spends its
    /// life parked in `next_event`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ConnectionClosed`] (or another registry
    /// error) only when the notification stream itself fails — cycle
    /// failures are logged and do not end the loop.
    pub async fn run(
        &self,
        registry: &mut dyn VariableRegistry,
        persister: &PersistConfigUseCase,
    ) -> Result<(), RegistryError> {
        loop {
            let event = registry.next_event().await?;

            // Not our trigger: keep waiting.
            if event.kind != EventKind::Modified || event.subject != self.trigger {
                continue;
            }

            if self.verbose {
                info!("{} modified: saving all dirty variables", self.trigger_name);
            }

            match persister.run_cycle(registry).await {
                Ok(report) => {
                    if self.verbose {
                        info!(
                            "saved {} variables to {} ({} skipped)",
                            report.saved,
                            persister.target().display(),
                            report.skipped
                        );
                    }
                }
                Err(e) => {
                    // The canonical file is untouched; the next trigger is
                    // the retry.
                    error!(
                        "failed to create configuration file {}: {e}",
                        persister.target().display()
                    );
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use varsave_core::{ChangeEvent, VarRecord, VarValue, CONFIG_HEADER};

    use super::*;
    use crate::infrastructure::registry::mock::MockRegistry;
    use crate::infrastructure::storage::atomic::AtomicConfigFile;

    const TRIGGER: VarHandle = VarHandle(17);

    fn temp_target() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("varsave_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("usersettings.cfg")
    }

    fn listener() -> TriggerListener {
        TriggerListener::new(TRIGGER, "/sys/config/save", false)
    }

    fn registry_with(events: Vec<ChangeEvent>, dirty: Vec<VarRecord>) -> MockRegistry {
        let mut registry = MockRegistry::new();
        registry.dirty = dirty;
        for event in events {
            registry.push_event(event);
        }
        registry
    }

    #[tokio::test]
    async fn test_matching_event_runs_one_cycle() {
        // Arrange
        let target = temp_target();
        let persister =
            PersistConfigUseCase::new(Arc::new(AtomicConfigFile::new(target.clone())));
        let mut registry = registry_with(
            vec![ChangeEvent {
                kind: EventKind::Modified,
                subject: TRIGGER,
            }],
            vec![VarRecord::singleton("/sys/name", VarValue::Str("alice".into()))],
        );

        // Act: the queue drains after one event, ending the stream.
        let result = listener().run(&mut registry, &persister).await;

        // Assert
        assert!(matches!(result, Err(RegistryError::ConnectionClosed)));
        let content = std::fs::read_to_string(&target).expect("file must exist");
        assert_eq!(content, format!("{CONFIG_HEADER}/sys/name=alice\n"));
    }

    #[tokio::test]
    async fn test_event_for_other_handle_does_not_run_a_cycle() {
        // Arrange: right kind, wrong subject.
        let target = temp_target();
        let persister =
            PersistConfigUseCase::new(Arc::new(AtomicConfigFile::new(target.clone())));
        let mut registry = registry_with(
            vec![ChangeEvent {
                kind: EventKind::Modified,
                subject: VarHandle(99),
            }],
            vec![VarRecord::singleton("/sys/name", VarValue::Str("alice".into()))],
        );

        // Act
        let _ = listener().run(&mut registry, &persister).await;

        // Assert: listener kept waiting; no file was ever written.
        assert!(!target.exists(), "no persistence cycle may run");
    }

    #[tokio::test]
    async fn test_non_modified_event_on_trigger_is_discarded() {
        let target = temp_target();
        let persister =
            PersistConfigUseCase::new(Arc::new(AtomicConfigFile::new(target.clone())));
        let mut registry = registry_with(
            vec![ChangeEvent {
                kind: EventKind::Calc,
                subject: TRIGGER,
            }],
            Vec::new(),
        );

        let _ = listener().run(&mut registry, &persister).await;

        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_cycle_failure_does_not_end_the_loop() {
        // Arrange: target under a path that cannot be created, so every
        // cycle aborts; two matching events must both be consumed.
        let bogus = PathBuf::from("/nonexistent/varsave/usersettings.cfg");
        let persister = PersistConfigUseCase::new(Arc::new(AtomicConfigFile::new(bogus)));
        let matching = ChangeEvent {
            kind: EventKind::Modified,
            subject: TRIGGER,
        };
        let mut registry = registry_with(vec![matching, matching], Vec::new());

        // Act: the loop must survive both failed cycles and only return
        // once the event stream ends.
        let result = listener().run(&mut registry, &persister).await;

        assert!(matches!(result, Err(RegistryError::ConnectionClosed)));
        assert!(registry.events.is_empty(), "both events consumed");
    }
}
