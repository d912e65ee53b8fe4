//! Reload client registry and broadcast.
//!
//! Holds every connected reload client and pushes messages to all of
//! them, pruning clients whose socket has gone away. A pending build
//! error is kept as a snapshot so clients that connect late still get the
//! overlay.

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::debug;

use super::message::ReloadMessage;

/// Shared registry of connected reload clients.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    /// Connected clients (shared between acceptor and broadcasters)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    /// Pending error to send to new clients (snapshot recovery)
    pending_error: Arc<Mutex<Option<(String, String)>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Perform the WebSocket handshake and register the client.
    ///
    /// New clients get a `connected` greeting, plus the pending error
    /// overlay when the last build round failed.
    pub fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                debug!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        let greeting = ReloadMessage::connected().to_json();
        if ws.send(Message::Text(greeting.into())).is_err() {
            return;
        }

        if let Some((bundle, error)) = self.pending_error.lock().clone() {
            let overlay = ReloadMessage::build_error(bundle, error).to_json();
            let _ = ws.send(Message::Text(overlay.into()));
        }

        self.clients.lock().push(ws);
    }

    /// Send a message to every connected client, dropping dead sockets.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let json = msg.to_json();
        let mut clients = self.clients.lock();
        clients.retain_mut(|ws| ws.send(Message::Text(json.clone().into())).is_ok());
    }

    /// Record a build error and push the overlay to all clients.
    pub fn set_error(&self, bundle: &str, error: &str) {
        *self.pending_error.lock() = Some((bundle.to_string(), error.to_string()));
        self.broadcast(&ReloadMessage::build_error(bundle, error));
    }

    /// Clear the pending error and the overlay on all clients.
    pub fn clear_error(&self) {
        let had_error = self.pending_error.lock().take().is_some();
        if had_error {
            self.broadcast(&ReloadMessage::clear_error());
        }
    }

    /// Whether a build error is currently pending.
    pub fn has_error(&self) -> bool {
        self.pending_error.lock().is_some()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Close every client connection.
    pub fn close_all(&self) {
        let mut clients = self.clients.lock();
        for ws in clients.iter_mut() {
            let _ = ws.close(None);
        }
        clients.clear();
    }
}
