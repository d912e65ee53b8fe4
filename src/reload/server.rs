//! WebSocket server for the reload channel.
//!
//! Binds the fixed dev port and hands accepted sockets to the client
//! registry. The port is a contract with the reload client injected into
//! the HTML shell, so there is no retry: a bound port is an unrecoverable
//! startup failure, surfaced before any child process is spawned.

use std::net::TcpListener;
use std::time::Duration;

use crate::sequencer::SequencerError;
use crate::{debug, log};

use super::broadcast::ClientRegistry;

/// Bound reload channel, not yet accepting.
#[derive(Debug)]
pub struct ReloadServer {
    listener: TcpListener,
    port: u16,
}

impl ReloadServer {
    /// Bind the fixed dev port. Single attempt; a bound port is fatal.
    pub fn bind(port: u16) -> Result<Self, SequencerError> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .map_err(|e| SequencerError::PortInUse(port, e))?;

        log!("dev"; "reload channel on ws://127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Start the acceptor thread; accepted sockets go to the registry.
    pub fn start(self, registry: ClientRegistry) {
        if let Err(e) = self.listener.set_nonblocking(true) {
            log!("reload"; "failed to start acceptor: {}", e);
            return;
        }
        let listener = self.listener;

        std::thread::spawn(move || {
            loop {
                if crate::core::is_shutdown() {
                    registry.close_all();
                    break;
                }

                match listener.accept() {
                    Ok((stream, addr)) => {
                        debug!("reload"; "client connected: {}", addr);
                        // Set blocking for WebSocket operations
                        let _ = stream.set_nonblocking(false);
                        registry.add_client(stream);
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(100));
                    }
                    Err(e) => {
                        log!("reload"; "accept error: {}", e);
                        std::thread::sleep(Duration::from_millis(100));
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_free_port() {
        // Bind an ephemeral port first to learn a free one, then rebind it
        let probe = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        let server = ReloadServer::bind(port).unwrap();
        assert_eq!(server.port(), port);
    }

    #[test]
    fn test_bind_occupied_port_fails() {
        let holder = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = holder.local_addr().unwrap().port();

        let err = ReloadServer::bind(port).unwrap_err();
        assert!(matches!(err, SequencerError::PortInUse(p, _) if p == port));
    }
}
