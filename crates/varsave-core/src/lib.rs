//! # varsave-core
//!
//! Shared library for the varsave save service containing the variable
//! model, the on-disk configuration file format, and the wire messages
//! exchanged with the variable registry server.
//!
//! This crate is used by the `varsave-svc` daemon and by any future tooling
//! that reads or produces the same configuration artifact (e.g. a load
//! utility).  It has zero dependencies on OS APIs, sockets, or the async
//! runtime.
//!
//! # Architecture overview (for beginners)
//!
//! varsave is a small save-on-demand daemon.  An external *variable
//! registry* holds a set of named, typed process-wide variables and tracks
//! which of them are "dirty" (modified since the last save).  When a
//! designated *trigger variable* is modified, the daemon enumerates the
//! dirty set and writes it atomically to a configuration file.
//!
//! This crate (`varsave-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – The variable model: opaque registry handles, optional
//!   instance qualifiers, and typed values with their canonical textual
//!   rendering.
//!
//! - **`format`** – The configuration artifact: a fixed header line followed
//!   by one `name=value` (or `[instance]name=value`) line per saved
//!   variable.  This format is consumed by an external load utility and
//!   must stay byte-compatible with it.
//!
//! - **`protocol`** – The JSON message types spoken over the registry's
//!   Unix domain socket: client requests (lookup, watch, dirty-set cursor)
//!   and server messages (replies plus asynchronously pushed change events).

// Declare the three top-level modules.  Rust will look for each in a
// subdirectory with the same name (e.g., src/domain/mod.rs).
pub mod domain;
pub mod format;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `varsave_core::VarRecord` instead of `varsave_core::domain::variable::VarRecord`.
pub use domain::variable::{InstanceId, ValueError, VarHandle, VarRecord, VarValue};
pub use format::{config_line, CONFIG_HEADER};
pub use protocol::messages::{ChangeEvent, ClientRequest, EventKind, ServerMessage};
