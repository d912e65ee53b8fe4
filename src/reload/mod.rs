//! Development-time reload channel.
//!
//! Serves compiled-artifact change signals to the running renderer over a
//! single fixed TCP port, with no HTTP server wrapper: delivery happens on
//! the WebSocket channel itself.

mod broadcast;
mod message;
mod server;

pub use broadcast::ClientRegistry;
pub use message::ReloadMessage;
pub use server::ReloadServer;
