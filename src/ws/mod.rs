//! WebSocket connection lifecycle (spec.md §4.I).
pub mod engine;
pub mod handshake;

pub use engine::{serve, Callbacks, WebSocketTransport, WsMessage, WsMiddleware};
pub use handshake::{accept_key, is_upgrade_request, sec_websocket_key};
