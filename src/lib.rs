//! A typed HTTP micro-framework core: request binding, validation, a
//! uniform middleware contract, pluggable authentication, deterministic
//! error reporting, and a parallel WebSocket lifecycle. This crate is the
//! core described above, not a server application — bring your own TCP
//! loop (see [`server`]) or transport adapter.
//!
//! * Typed [param & body binding](crate::bind) via [`bind_params!`]
//! * [Validation](crate::validate) on top of [`validator`]
//! * A canonical [error model](crate::error) and [middleware chain](crate::middleware)
//! * [Auth strategies](crate::auth): basic, bearer, API key, session cookie
//! * Path-based [request routing](crate::router::Router) with named
//!   segments, wildcards and prefix matches
//! * The [JSON handler engine](crate::json_engine) gluing binder, validator,
//!   auth and content (de)serialization together
//! * A callback-driven [WebSocket lifecycle](crate::ws)
//!
//! # Example
//! ```
//! use tyhttp::prelude::*;
//! use tyhttp::io::ReadWriteAdapter;
//! use tyhttp::router::Router;
//! use tyhttp::server::StreamServer;
//!
//! fn handle_hello(_req: RawRequest, _ctx: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
//!     Ok(Response::new(200).with_payload(b"Hello!".to_vec()))
//! }
//!
//! fn api() -> Router<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> {
//!     Router::new().get("/hello", handle_hello)
//! }
//!
//! fn main() {
//!     let request = b"GET /hello HTTP/1.0\r\nAccept: */*\r\n\r\n";
//!     let mut write_buf = vec![];
//!     let stream = ReadWriteAdapter::new(&request[..], &mut write_buf);
//!     let mut server = StreamServer::new(stream, api());
//!     server.serve_one().unwrap();
//!     println!("Response:\n{}", std::str::from_utf8(&write_buf[..]).unwrap());
//! }
//! ```
pub mod api;
pub mod auth;
pub mod bind;
pub mod content;
pub mod context;
pub mod docs;
pub mod error;
pub mod filter;
pub mod handler;
pub mod io;
pub mod json_engine;
pub mod middleware;
pub mod prelude;
pub mod request;
pub mod response;
pub mod router;
pub mod runner;
pub mod server;
pub mod settings;
pub mod validate;
pub mod ws;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
