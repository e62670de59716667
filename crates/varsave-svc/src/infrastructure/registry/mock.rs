//! Mock variable registry for unit and integration testing.
//!
//! # Why a mock registry?
//!
//! The real registry is a separate server process reached over a Unix
//! domain socket.  Tests that exercised it directly would:
//!
//! - Require the server binary to be installed and running.
//! - Depend on its live variable set, which tests cannot control.
//! - Be unable to script failure cases (refused watches, lost connections).
//!
//! `MockRegistry` replaces the socket round-trips with plain in-memory
//! state.  Tests preload the variable table, the dirty set, and a queue of
//! change events, then assert on what the daemon did with them.
//!
//! # Event queue semantics
//!
//! `next_event` pops the front of `events`; when the queue is empty it
//! returns [`RegistryError::ConnectionClosed`], which is exactly what the
//! socket client reports when the server goes away.  A listener test can
//! therefore script "N events, then disconnect" and observe the loop end.
//!
//! # Failure injection
//!
//! Set `fail_watch` or `fail_enumeration` before the call under test to
//! exercise the corresponding error path in callers.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use varsave_core::{ChangeEvent, VarHandle, VarRecord};

use crate::application::registry::{RegistryError, VariableRegistry};

/// An in-memory registry that serves scripted data without any socket I/O.
#[derive(Default)]
pub struct MockRegistry {
    /// Name → handle table consulted by `find_variable`.
    pub variables: HashMap<String, VarHandle>,
    /// Records served by the first/next dirty cursor, in order.
    pub dirty: Vec<VarRecord>,
    /// Scripted change events, delivered front to back.
    pub events: VecDeque<ChangeEvent>,
    /// Handles passed to `watch_modified`, in call order.
    pub watched: Vec<VarHandle>,
    /// When `true`, `watch_modified` reports a refused registration.
    pub fail_watch: bool,
    /// When `true`, the dirty cursor fails instead of yielding records.
    pub fail_enumeration: bool,
    /// Set by `close`.
    pub closed: bool,
    cursor: usize,
}

impl MockRegistry {
    /// Creates an empty mock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name → handle mapping for `find_variable`.
    pub fn insert_variable(&mut self, name: impl Into<String>, handle: VarHandle) {
        self.variables.insert(name.into(), handle);
    }

    /// Appends a change event to the delivery queue.
    pub fn push_event(&mut self, event: ChangeEvent) {
        self.events.push_back(event);
    }

    fn yield_current(&mut self) -> Option<VarRecord> {
        let record = self.dirty.get(self.cursor).cloned();
        if record.is_some() {
            self.cursor += 1;
        }
        record
    }
}

#[async_trait]
impl VariableRegistry for MockRegistry {
    async fn find_variable(&mut self, name: &str) -> Result<VarHandle, RegistryError> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    async fn watch_modified(&mut self, handle: VarHandle) -> Result<(), RegistryError> {
        if self.fail_watch {
            return Err(RegistryError::WatchRefused(handle));
        }
        self.watched.push(handle);
        Ok(())
    }

    async fn next_event(&mut self) -> Result<ChangeEvent, RegistryError> {
        self.events
            .pop_front()
            .ok_or(RegistryError::ConnectionClosed)
    }

    async fn first_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError> {
        if self.fail_enumeration {
            return Err(RegistryError::Protocol("mock enumeration failure".into()));
        }
        self.cursor = 0;
        Ok(self.yield_current())
    }

    async fn next_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError> {
        if self.fail_enumeration {
            return Err(RegistryError::Protocol("mock enumeration failure".into()));
        }
        Ok(self.yield_current())
    }

    async fn close(&mut self) {
        self.closed = true;
        self.events.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use varsave_core::{EventKind, VarValue};

    use super::*;

    #[tokio::test]
    async fn test_find_variable_resolves_inserted_name() {
        let mut registry = MockRegistry::new();
        registry.insert_variable("/sys/config/save", VarHandle(17));

        let handle = registry.find_variable("/sys/config/save").await.unwrap();
        assert_eq!(handle, VarHandle(17));
    }

    #[tokio::test]
    async fn test_find_variable_reports_unknown_name() {
        let mut registry = MockRegistry::new();
        let result = registry.find_variable("/no/such/var").await;
        assert!(matches!(result, Err(RegistryError::NotFound(name)) if name == "/no/such/var"));
    }

    #[tokio::test]
    async fn test_dirty_cursor_yields_records_then_none() {
        let mut registry = MockRegistry::new();
        registry.dirty = vec![
            VarRecord::singleton("/sys/a", VarValue::Int(1)),
            VarRecord::singleton("/sys/b", VarValue::Int(2)),
        ];

        assert_eq!(
            registry.first_dirty().await.unwrap().unwrap().name,
            "/sys/a"
        );
        assert_eq!(registry.next_dirty().await.unwrap().unwrap().name, "/sys/b");
        assert!(registry.next_dirty().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_dirty_restarts_the_cursor() {
        let mut registry = MockRegistry::new();
        registry.dirty = vec![VarRecord::singleton("/sys/a", VarValue::Int(1))];

        registry.first_dirty().await.unwrap();
        assert!(registry.next_dirty().await.unwrap().is_none());

        // A fresh cycle starts over from the first record.
        assert!(registry.first_dirty().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_empty_event_queue_reports_connection_closed() {
        let mut registry = MockRegistry::new();
        registry.push_event(ChangeEvent {
            kind: EventKind::Modified,
            subject: VarHandle(1),
        });

        assert!(registry.next_event().await.is_ok());
        assert!(matches!(
            registry.next_event().await,
            Err(RegistryError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_watch_refusal_is_injectable() {
        let mut registry = MockRegistry::new();
        registry.fail_watch = true;

        let result = registry.watch_modified(VarHandle(17)).await;
        assert!(matches!(result, Err(RegistryError::WatchRefused(_))));
        assert!(registry.watched.is_empty());
    }
}
