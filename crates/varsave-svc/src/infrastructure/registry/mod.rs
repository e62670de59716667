//! Variable-registry adapters.
//!
//! `socket` is the production client; `mock` is the in-memory test double.

pub mod mock;
pub mod socket;
