//! Configuration file storage.

pub mod atomic;

pub use atomic::AtomicConfigFile;
