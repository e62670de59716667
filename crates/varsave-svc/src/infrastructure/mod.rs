//! Infrastructure layer for the save service.
//!
//! Contains the adapters that touch the outside world: the registry socket
//! client and the atomic file store.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `varsave_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`registry`** – Implementations of the
//!   [`crate::application::registry::VariableRegistry`] port: the
//!   production Unix-socket JSON-lines client, and an in-memory mock for
//!   tests.
//!
//! - **`storage`** – The [`crate::application::persist::ConfigStore`]
//!   implementation: temporary file plus atomic rename, the mechanism that
//!   makes a persistence cycle crash-safe.

pub mod registry;
pub mod storage;
