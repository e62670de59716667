//! The variable-registry port consumed by the application layer.
//!
//! The registry server is an external collaborator: it owns the live
//! variables, their type tags, and their dirty flags.  This module defines
//! the narrow interface the daemon needs from it.  Implementations live in
//! the infrastructure layer: [`crate::infrastructure::registry::socket::SocketRegistry`]
//! for the real Unix-socket server and
//! [`crate::infrastructure::registry::mock::MockRegistry`] for tests.

use async_trait::async_trait;
use thiserror::Error;

use varsave_core::{ChangeEvent, VarHandle, VarRecord};

/// Error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A variable name could not be resolved to a handle.
    #[error("cannot find variable: {0}")]
    NotFound(String),

    /// The registry refused a notification registration.
    #[error("notification request refused for handle {0:?}")]
    WatchRefused(VarHandle),

    /// The connection to the registry server ended.  Once this is
    /// returned, no further operation on the connection can succeed.
    #[error("registry connection closed")]
    ConnectionClosed,

    /// A socket-level I/O failure.
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent a reply this client cannot interpret, or reported
    /// an unexpected failure.
    #[error("registry protocol error: {0}")]
    Protocol(String),
}

/// Everything the save service needs from the external variable registry.
///
/// The dirty-set enumeration is a server-side cursor: `first_dirty`
/// restarts it and each call yields the next record until `Ok(None)`
/// signals "no more results".  The sequence is lazy, finite, and not
/// restartable mid-flight other than by calling `first_dirty` again.
///
/// All methods take `&mut self`: the daemon drives the registry from a
/// single logical thread and the cursor is connection state, so there is
/// nothing to share.
#[async_trait]
pub trait VariableRegistry: Send {
    /// Resolves a variable name to a handle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the registry does not know
    /// the name.
    async fn find_variable(&mut self, name: &str) -> Result<VarHandle, RegistryError>;

    /// Registers interest in "modified" events for `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::WatchRefused`] when the registry rejects
    /// the registration.
    async fn watch_modified(&mut self, handle: VarHandle) -> Result<(), RegistryError>;

    /// Blocks until the next change event arrives.
    ///
    /// This is the daemon's one true suspension point: the listener parks
    /// here indefinitely between persistence cycles.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ConnectionClosed`] when the event stream
    /// ends (registry shut down or connection lost).
    async fn next_event(&mut self) -> Result<ChangeEvent, RegistryError>;

    /// Restarts the dirty-set cursor and yields its first record, or
    /// `Ok(None)` if no variable is currently dirty.
    async fn first_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError>;

    /// Yields the next record from the dirty-set cursor, or `Ok(None)`
    /// when the cursor is exhausted.
    async fn next_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError>;

    /// Releases the registry connection.  Best effort: failures are
    /// swallowed because this runs on shutdown paths (including the
    /// termination-signal path) where nothing can be done about them.
    async fn close(&mut self);
}
