//! JSON message types for the registry socket protocol.
//!
//! The daemon talks to the variable registry server over a Unix domain
//! socket carrying newline-delimited JSON: one message per line, each a JSON
//! object with a `"type"` field identifying the variant (serde's
//! `#[serde(tag = "type")]` representation).
//!
//! # Message flow
//!
//! ```text
//! daemon → registry:  ClientRequest   (one JSON line per request)
//! registry → daemon:  ServerMessage   (replies, interleaved with pushed
//!                                      change events)
//! ```
//!
//! Replies arrive in request order.  [`ServerMessage::Event`] lines are
//! *not* replies — the server pushes one whenever a watched variable
//! changes, and they may appear between any request and its reply.  The
//! client's socket reader routes the two streams apart.
//!
//! # Why a first/next cursor instead of one bulk reply?
//!
//! The dirty set is unbounded and the registry holds the enumeration state
//! server-side.  Mirroring that as a `FirstDirty`/`NextDirty` request pair
//! keeps the protocol memory-flat on both ends and maps directly onto the
//! lazy, finite, non-restartable sequence the saver consumes.

use serde::{Deserialize, Serialize};

use crate::domain::variable::{VarHandle, VarRecord};

// ── Requests (daemon → registry) ──────────────────────────────────────────────

/// All requests the daemon can send to the registry server.
///
/// # Serde representation
///
/// ```json
/// {"type":"FindVariable","name":"/sys/config/save"}
/// {"type":"Watch","handle":17,"kind":"Modified"}
/// {"type":"FirstDirty"}
/// {"type":"NextDirty"}
/// {"type":"Close"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Resolve a variable name to a handle.
    FindVariable { name: String },
    /// Register interest in change events of `kind` for `handle`.
    Watch { handle: VarHandle, kind: EventKind },
    /// Restart the dirty-set cursor and fetch the first record.
    FirstDirty,
    /// Fetch the next record from the dirty-set cursor.
    NextDirty,
    /// Announce an orderly disconnect.  Best effort; the server also
    /// handles an abrupt socket close.
    Close,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// The kinds of change notification the registry can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A variable's value was written.
    Modified,
    /// A calculated variable was read and re-evaluated.
    Calc,
    /// A variable was rendered for printing.
    Print,
}

/// One pushed change notification: what happened, and to which variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The event kind the subject was registered for.
    pub kind: EventKind,
    /// Handle of the variable the event concerns.
    pub subject: VarHandle,
}

// ── Server messages (registry → daemon) ───────────────────────────────────────

/// All messages the registry server can send to the daemon.
///
/// `Handle`, `Ack`, `Record`, `Done`, and `Error` are replies to a
/// [`ClientRequest`]; `Event` is pushed asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to `FindVariable`: the resolved handle.
    Handle { handle: VarHandle },
    /// Positive reply to requests with no payload (`Watch`, `Close`).
    Ack,
    /// Reply to `FirstDirty`/`NextDirty`: one enumerated record.
    Record { record: VarRecord },
    /// Reply to `FirstDirty`/`NextDirty`: the cursor is exhausted.
    Done,
    /// Negative reply to any request.
    Error { message: String },
    /// Pushed change notification for a watched variable.
    Event { kind: EventKind, subject: VarHandle },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
