//! varsave-svc library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does varsave-svc do? (for beginners)
//!
//! An external *variable registry* server holds a set of process-wide named
//! variables and marks each one "dirty" when it is modified after the last
//! save.  varsave-svc is the daemon that turns those in-memory changes into
//! a durable configuration file:
//!
//! 1. It connects to the registry and resolves the configured *trigger
//!    variable* name to a handle.
//! 2. It registers for "modified" notifications on that handle and blocks
//!    waiting for the next event.
//! 3. When the trigger fires, it enumerates every dirty variable through
//!    the registry's first/next cursor and writes one `name=value` line per
//!    record to a freshly created temporary file.
//! 4. It publishes the temporary file over the canonical path with an
//!    atomic rename, so a reader never observes a partially written file —
//!    not even if the daemon is killed mid-cycle.
//!
//! The daemon never decides *which* variables are dirty and never clears
//! the dirty flag; both belong to the registry.

/// Application layer: the persist and trigger-listener use cases plus the
/// ports they consume.
pub mod application;

/// Infrastructure layer: registry socket adapter, mock registry, and the
/// atomic file store.
pub mod infrastructure;
