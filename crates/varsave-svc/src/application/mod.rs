//! Application layer use cases for the save service.
//!
//! # What use cases does the daemon have?
//!
//! - **`persist`** – Runs one atomic persistence cycle: creates a fresh
//!   session on the [`persist::ConfigStore`] port, writes the file header,
//!   streams every dirty record from the registry cursor through the line
//!   formatter, and commits.  Per-record conversion failures are skipped;
//!   any I/O failure aborts the cycle with the canonical file untouched.
//!
//! - **`trigger`** – The event loop: receives change events from the
//!   registry, discards anything that is not a "modified" event on the
//!   trigger handle, and invokes the persister synchronously on a match.
//!
//! - **`registry`** – The [`registry::VariableRegistry`] port describing
//!   everything the daemon needs from the external registry server.  The
//!   production socket adapter and the in-memory mock both live in the
//!   infrastructure layer.

pub mod persist;
pub mod registry;
pub mod trigger;
