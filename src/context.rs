//! The per-request context carrier (spec.md §4.D).
//!
//! This is the `C` type parameter threaded through every
//! [`Handler`](crate::handler::Handler) in the teacher's filter-chain design
//! (`auth::Authenticator`, `filter::RequestFilter`, ...); middleware mutates
//! it through `&mut C`, handlers only read from it.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::settings::RequestSettings;

/// A thin wrapper around the `log` facade that prefixes every record with
/// fields bound once per request (correlation id, method, path). It is not
/// a new logging framework, just structured-field formatting in front of
/// `log::{trace,debug,info,warn,error}`, the same macros the teacher's
/// `server::tcp::TcpServer` already calls directly.
#[derive(Debug, Clone, Default)]
pub struct ScopedLogger {
    fields: Vec<(String, String)>,
}

impl ScopedLogger {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }
    pub fn with_field(mut self, key: &str, value: &str) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }
    fn prefix(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
    pub fn trace(&self, msg: &str) {
        log::trace!("{} {}", self.prefix(), msg);
    }
    pub fn debug(&self, msg: &str) {
        log::debug!("{} {}", self.prefix(), msg);
    }
    pub fn info(&self, msg: &str) {
        log::info!("{} {}", self.prefix(), msg);
    }
    pub fn warn(&self, msg: &str) {
        log::warn!("{} {}", self.prefix(), msg);
    }
    pub fn error(&self, msg: &str) {
        log::error!("{} {}", self.prefix(), msg);
    }
    pub fn log_at(&self, level: log::Level, msg: &str) {
        log::log!(level, "{} {}", self.prefix(), msg);
    }
}

/// The per-request context carrier. Implements `Default` so the teacher's
/// `Server<C: Default>` can construct one per request/connection; fields
/// that need process-wide state (settings) start out as a default value and
/// are overwritten by the settings-attach middleware (spec.md §4.E item 1)
/// before anything else runs.
///
/// `principal` is kept behind an `Arc` rather than a `Box` so the whole
/// context is cheaply `Clone`: the WebSocket message loop (spec.md §4.I
/// "message loop") derives a fresh context from the connection's base
/// context on every iteration by running middleware over a clone of it.
#[derive(Clone)]
pub struct RequestContext {
    correlation_id: Option<String>,
    logger: ScopedLogger,
    settings: Arc<RequestSettings>,
    principal: Option<Arc<dyn Any + Send + Sync>>,
    ws_connection_id: Option<Uuid>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            correlation_id: None,
            logger: ScopedLogger::new(),
            settings: Arc::new(RequestSettings::default()),
            principal: None,
            ws_connection_id: None,
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id)
            .field("has_principal", &self.principal.is_some())
            .field("ws_connection_id", &self.ws_connection_id)
            .finish()
    }
}

impl RequestContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
    pub fn set_correlation_id(&mut self, id: String) {
        self.correlation_id = Some(id);
    }
    pub fn logger(&self) -> &ScopedLogger {
        &self.logger
    }
    pub fn set_logger(&mut self, logger: ScopedLogger) {
        self.logger = logger;
    }
    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }
    pub fn set_settings(&mut self, settings: Arc<RequestSettings>) {
        self.settings = settings;
    }
    /// Attach the authenticated principal. Called once by an auth strategy
    /// after `verify` succeeds (spec.md §4.F).
    pub fn set_principal<A: 'static + Send + Sync>(&mut self, principal: A) {
        self.principal = Some(Arc::new(principal));
    }
    /// Read the principal back as `A`. Returns `None` if the route is
    /// unauthenticated or `A` doesn't match what was stored.
    pub fn principal<A: 'static>(&self) -> Option<&A> {
        self.principal.as_ref().and_then(|p| p.downcast_ref::<A>())
    }
    /// The well-known slot for the WebSocket connection id (spec.md §4.I
    /// step 5), stable for the lifetime of the socket.
    pub fn ws_connection_id(&self) -> Option<Uuid> {
        self.ws_connection_id
    }
    pub fn set_ws_connection_id(&mut self, id: Uuid) {
        self.ws_connection_id = Some(id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_principal_roundtrip() {
        #[derive(Debug, PartialEq)]
        struct User(String);

        let mut ctx = RequestContext::default();
        assert!(ctx.principal::<User>().is_none());
        ctx.set_principal(User("alice".to_string()));
        assert_eq!(ctx.principal::<User>(), Some(&User("alice".to_string())));
    }

    #[test]
    fn test_default_has_no_correlation_id() {
        let ctx = RequestContext::default();
        assert_eq!(ctx.correlation_id(), None);
    }
}
