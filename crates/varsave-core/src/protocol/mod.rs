//! Protocol module containing the registry wire message types.

pub mod messages;

pub use messages::{ChangeEvent, ClientRequest, EventKind, ServerMessage};
