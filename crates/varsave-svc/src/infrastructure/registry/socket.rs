//! Unix domain socket client for the variable registry server.
//!
//! The wire format is newline-delimited JSON: each line is one
//! [`ClientRequest`] (daemon → server) or one [`ServerMessage`]
//! (server → daemon).
//!
//! # Two interleaved streams on one socket
//!
//! The server sends two kinds of line: *replies* to requests, and *pushed
//! change events* for watched variables.  An event may arrive between a
//! request and its reply.  To keep the client API simple, the connection is
//! split: the write half stays with [`SocketRegistry`], while a spawned
//! reader task owns the read half and routes each parsed line onto one of
//! two channels — replies to `replies`, events to `events`.
//!
//! The daemon issues at most one request at a time (it is a single logical
//! thread of control), so replies need no correlation ids: the next
//! non-event line is the reply to the outstanding request.
//!
//! # Connection loss
//!
//! When the server closes the socket the reader task ends, both channels
//! drain, and every subsequent receive reports
//! [`RegistryError::ConnectionClosed`].  The daemon treats that as fatal —
//! it cannot observe triggers without the registry.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use varsave_core::{ChangeEvent, ClientRequest, EventKind, ServerMessage, VarHandle, VarRecord};

use crate::application::registry::{RegistryError, VariableRegistry};

/// Production implementation of the registry port.
pub struct SocketRegistry {
    write_half: OwnedWriteHalf,
    replies: mpsc::Receiver<ServerMessage>,
    events: mpsc::Receiver<ChangeEvent>,
}

impl SocketRegistry {
    /// Connects to the registry server listening at `socket_path`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] when the socket cannot be connected
    /// (server not running, wrong path, permissions).
    pub async fn connect(socket_path: &Path) -> Result<Self, RegistryError> {
        let stream = UnixStream::connect(socket_path).await?;

        // Split into independent read and write halves so the reader task
        // can own the read side without sharing the client.
        let (read_half, write_half) = stream.into_split();

        let (reply_tx, replies) = mpsc::channel(16);
        let (event_tx, events) = mpsc::channel(64);
        tokio::spawn(route_server_messages(read_half, reply_tx, event_tx));

        Ok(Self {
            write_half,
            replies,
            events,
        })
    }

    /// Sends one request line and awaits the next reply line.
    async fn request(&mut self, request: &ClientRequest) -> Result<ServerMessage, RegistryError> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| RegistryError::Protocol(format!("cannot encode request: {e}")))?;
        line.push('\n');
        self.write_half.write_all(line.as_bytes()).await?;

        self.replies
            .recv()
            .await
            .ok_or(RegistryError::ConnectionClosed)
    }

    /// Maps a `FirstDirty`/`NextDirty` reply onto the cursor contract.
    fn cursor_reply(reply: ServerMessage) -> Result<Option<VarRecord>, RegistryError> {
        match reply {
            ServerMessage::Record { record } => Ok(Some(record)),
            ServerMessage::Done => Ok(None),
            ServerMessage::Error { message } => Err(RegistryError::Protocol(message)),
            other => Err(RegistryError::Protocol(format!(
                "unexpected cursor reply: {other:?}"
            ))),
        }
    }
}

#[async_trait]
impl VariableRegistry for SocketRegistry {
    async fn find_variable(&mut self, name: &str) -> Result<VarHandle, RegistryError> {
        let reply = self
            .request(&ClientRequest::FindVariable {
                name: name.to_string(),
            })
            .await?;
        match reply {
            ServerMessage::Handle { handle } => Ok(handle),
            ServerMessage::Error { .. } => Err(RegistryError::NotFound(name.to_string())),
            other => Err(RegistryError::Protocol(format!(
                "unexpected FindVariable reply: {other:?}"
            ))),
        }
    }

    async fn watch_modified(&mut self, handle: VarHandle) -> Result<(), RegistryError> {
        let reply = self
            .request(&ClientRequest::Watch {
                handle,
                kind: EventKind::Modified,
            })
            .await?;
        match reply {
            ServerMessage::Ack => Ok(()),
            ServerMessage::Error { .. } => Err(RegistryError::WatchRefused(handle)),
            other => Err(RegistryError::Protocol(format!(
                "unexpected Watch reply: {other:?}"
            ))),
        }
    }

    async fn next_event(&mut self) -> Result<ChangeEvent, RegistryError> {
        self.events
            .recv()
            .await
            .ok_or(RegistryError::ConnectionClosed)
    }

    async fn first_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError> {
        let reply = self.request(&ClientRequest::FirstDirty).await?;
        Self::cursor_reply(reply)
    }

    async fn next_dirty(&mut self) -> Result<Option<VarRecord>, RegistryError> {
        let reply = self.request(&ClientRequest::NextDirty).await?;
        Self::cursor_reply(reply)
    }

    async fn close(&mut self) {
        // Best effort: announce the disconnect, then shut the write side so
        // the server sees EOF.  Runs on shutdown paths, so failures are only
        // logged.
        if let Ok(mut line) = serde_json::to_string(&ClientRequest::Close) {
            line.push('\n');
            let _ = self.write_half.write_all(line.as_bytes()).await;
        }
        if let Err(e) = self.write_half.shutdown().await {
            debug!("registry socket shutdown failed: {e}");
        }
    }
}

// ── Reader task ───────────────────────────────────────────────────────────────

/// Reads server lines and routes them: events to `event_tx`, everything
/// else (replies) to `reply_tx`.
///
/// Returns when the socket reaches EOF, a line fails to parse, or both
/// receivers have been dropped.
async fn route_server_messages(
    read_half: OwnedReadHalf,
    reply_tx: mpsc::Sender<ServerMessage>,
    event_tx: mpsc::Sender<ChangeEvent>,
) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("registry socket closed (EOF)");
                break;
            }
            Err(e) => {
                warn!("read from registry failed: {e}");
                break;
            }
        };

        let message: ServerMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                // The stream is line-framed; one unparseable line means the
                // connection is unsalvageable.
                warn!("malformed registry message: {e}");
                break;
            }
        };

        let routed = match message {
            ServerMessage::Event { kind, subject } => event_tx
                .send(ChangeEvent { kind, subject })
                .await
                .is_ok(),
            reply => reply_tx.send(reply).await.is_ok(),
        };
        if !routed {
            debug!("registry client dropped; exiting reader");
            break;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
