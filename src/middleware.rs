//! The canonical middleware chain (spec.md §4.E).
//!
//! Most steps are built from the teacher's own filter combinators
//! (`Handler::request_filter`, `Handler::res_filter`); steps that need both
//! the inbound request and the outgoing response in the same place
//! (request logging, panic recovery, CORS) are small dedicated wrapper
//! structs in the same style as `auth::Authenticator`.
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use log::Level;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::handler::{Handler, Res};
use crate::request::{Header, Method, Request};
use crate::response::Response;
use crate::settings::{CorrelationIdMode, CorsSettings, RequestSettings};

/// Attach process-wide settings to the context (spec.md §4.E step 1). This
/// must run before every later middleware step, which all read settings
/// off the context rather than taking their own copy.
pub fn attach_settings<H, I, O, E>(
    handler: H,
    settings: Arc<RequestSettings>,
) -> impl Handler<I, O, E, RequestContext>
where
    H: Handler<I, O, E, RequestContext>,
    I: 'static + Sync,
    O: 'static + Sync,
    E: 'static + Sync,
{
    handler.request_filter(move |request: Request<I>, context: &mut RequestContext| {
        context.set_settings(settings.clone());
        Ok(request)
    })
}

/// Assign or reuse the correlation id (spec.md §4.E step 2, §3 "Correlation
/// id"). Must run after [`attach_settings`].
///
/// This is also the single point every response, success or error, funnels
/// back through before leaving the handler chain, so the response-side half
/// of this middleware is where the correlation id is written onto the
/// configured header (spec.md §3 "Attached to both the request context and
/// the response headers under the configured header name").
pub fn correlation_id<H, I, O, E>(handler: H) -> impl Handler<I, O, E, RequestContext>
where
    H: Handler<I, O, E, RequestContext>,
    I: 'static + Sync,
    O: 'static + Sync,
    E: 'static + Sync,
{
    handler
        .request_filter(|request: Request<I>, context: &mut RequestContext| {
            let header_name = context.settings().request_id_header.clone();
            let mode = context.settings().request_id_mode;
            let incoming = request.headers.get(&Header::new(&header_name)).cloned();
            let id = match (mode, incoming) {
                (CorrelationIdMode::AcceptFromHeader, Some(id)) if !id.is_empty() => id,
                _ => Uuid::now_v7().to_string(),
            };
            context.set_correlation_id(id);
            Ok(request)
        })
        .res_filter(|result: Res<O, E>, context: &mut RequestContext| {
            let header_name = context.settings().request_id_header.clone();
            let id = match context.correlation_id() {
                Some(id) => id.to_string(),
                None => return result,
            };
            match result {
                Ok(response) => Ok(response.with_header(&header_name, &id)),
                Err(response) => Err(response.with_header(&header_name, &id)),
            }
        })
}

/// Build the request-scoped logger, carrying the correlation id, method and
/// path on every subsequent log line (spec.md §4.E step 3). Must run after
/// [`correlation_id`].
pub fn inject_logger<H, I, O, E>(handler: H) -> impl Handler<I, O, E, RequestContext>
where
    H: Handler<I, O, E, RequestContext>,
    I: 'static + Sync,
    O: 'static + Sync,
    E: 'static + Sync,
{
    handler.request_filter(|request: Request<I>, context: &mut RequestContext| {
        let mut logger = crate::context::ScopedLogger::new()
            .with_field("method", &request.method.to_string())
            .with_field("path", &request.path);
        if let Some(id) = context.correlation_id() {
            logger = logger.with_field("request_id", id);
        }
        context.set_logger(logger);
        Ok(request)
    })
}

/// Recover from a handler panic, logging it (with a backtrace) and writing
/// the canonical error body instead of tearing down the connection (spec.md
/// §4.E "Panic recovery", §7 scenario #6). Should wrap as close to the
/// handler as possible so later middleware (CORS, request logging) still
/// sees the substituted response.
///
/// Bound to the raw byte pipeline, like [`crate::json_engine::JsonHandler`],
/// because the substitute response goes through
/// [`crate::error::write_error`], which always produces a `Response<Vec<u8>>`.
pub struct PanicRecovery<H> {
    handler: H,
}

impl<H> PanicRecovery<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H> Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> for PanicRecovery<H>
where
    H: Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext>,
{
    fn handle(&self, request: Request<Vec<u8>>, context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        let path = request.path.clone();
        let method = request.method;
        let handler = &self.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request, context))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(&payload);
                let backtrace = std::backtrace::Backtrace::force_capture();
                context
                    .logger()
                    .error(&format!("handler panicked: {}\n{}", message, backtrace));
                let mut snapshot = Request::default();
                snapshot.path = path;
                snapshot.method = method;
                let request_id = context.correlation_id().map(|s| s.to_string());
                Err(crate::error::write_error(
                    &snapshot,
                    request_id.as_deref(),
                    crate::error::ApiError::internal(message),
                ))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// CORS handling (spec.md §4.E "CORS"): answers preflight `OPTIONS`
/// requests directly and adds `Access-Control-Allow-*` headers to every
/// other response when the request carries a recognized `Origin`.
pub struct Cors<H> {
    handler: H,
}

impl<H> Cors<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }
}

impl<H, I, O, E> Handler<I, O, E, RequestContext> for Cors<H>
where
    H: Handler<I, O, E, RequestContext>,
    I: 'static + Sync,
    O: 'static + Sync,
    E: 'static + Sync,
{
    fn handle(&self, request: Request<I>, context: &mut RequestContext) -> Res<O, E> {
        let origin = request.headers.get(&Header::new("origin")).cloned();
        let cors = context.settings().cors.clone();

        if request.method == Method::OPTIONS && origin.is_some() {
            return Ok(apply_cors_headers(Response::new(204), origin.as_deref(), &cors));
        }

        match self.handler.handle(request, context) {
            Ok(response) => Ok(apply_cors_headers(response, origin.as_deref(), &cors)),
            Err(response) => Err(apply_cors_headers(response, origin.as_deref(), &cors)),
        }
    }
}

fn apply_cors_headers<T>(mut response: Response<T>, origin: Option<&str>, cors: &CorsSettings) -> Response<T> {
    if let Some(origin) = origin {
        if cors.allows_origin(origin) {
            response = response
                .with_header("Access-Control-Allow-Origin", origin)
                .with_header("Access-Control-Allow-Methods", &cors.allowed_methods.join(", "))
                .with_header("Access-Control-Allow-Headers", &cors.allowed_headers.join(", "));
            if cors.allow_credentials {
                response = response.with_header("Access-Control-Allow-Credentials", "true");
            }
        }
    }
    response
}

/// Which paths skip request logging, and what level logs a given path at
/// (spec.md §4.E "Request logger"). Built once at bootstrap and treated as
/// read-only once the server starts serving.
#[derive(Debug, Clone, Default)]
pub struct RequestLoggerConfig {
    excluded_paths: HashSet<String>,
    level_overrides: HashMap<String, Level>,
}

impl RequestLoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn exclude_path(mut self, path: &str) -> Self {
        self.excluded_paths.insert(path.to_string());
        self
    }
    pub fn with_level_for_path(mut self, path: &str, level: Level) -> Self {
        self.level_overrides.insert(path.to_string(), level);
        self
    }
    fn level_for(&self, path: &str) -> Level {
        self.level_overrides.get(path).copied().unwrap_or(Level::Info)
    }
}

/// Log one line per request, with the method, path, outcome status and
/// duration, unless the path is excluded.
pub struct RequestLogger<H> {
    handler: H,
    config: RequestLoggerConfig,
}

impl<H> RequestLogger<H> {
    pub fn new(handler: H, config: RequestLoggerConfig) -> Self {
        Self { handler, config }
    }
}

impl<H, I, O, E> Handler<I, O, E, RequestContext> for RequestLogger<H>
where
    H: Handler<I, O, E, RequestContext>,
    I: 'static + Sync,
    O: 'static + Sync,
    E: 'static + Sync,
{
    fn handle(&self, request: Request<I>, context: &mut RequestContext) -> Res<O, E> {
        let path = request.path.clone();
        let method = request.method;
        if self.config.excluded_paths.contains(&path) {
            return self.handler.handle(request, context);
        }
        let start = Instant::now();
        let result = self.handler.handle(request, context);
        let elapsed_ms = start.elapsed().as_millis();
        let (status, outcome) = match &result {
            Ok(r) => (r.status_code, "ok"),
            Err(r) => (r.status_code, "error"),
        };
        context.logger().log_at(
            self.config.level_for(&path),
            &format!("{} {} -> {} {} ({}ms)", method, path, status, outcome, elapsed_ms),
        );
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    fn ok(_req: Request<Vec<u8>>, _ctx: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        Ok(Response::new(200))
    }

    fn panics(_req: Request<Vec<u8>>, _ctx: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        panic!("boom");
    }

    #[test]
    fn test_correlation_id_generated_when_absent() {
        let handler = inject_logger(correlation_id(attach_settings(ok, Arc::new(RequestSettings::default()))));
        let mut context = RequestContext::default();
        handler.handle(Request::default(), &mut context).unwrap();
        assert!(context.correlation_id().is_some());
    }

    #[test]
    fn test_correlation_id_reused_from_header() {
        let handler = correlation_id(attach_settings(ok, Arc::new(RequestSettings::default())));
        let mut context = RequestContext::default();
        let request = Request::default().with_header("X-Request-Id", "req-123");
        handler.handle(request, &mut context).unwrap();
        assert_eq!(context.correlation_id(), Some("req-123"));
    }

    #[test]
    fn test_correlation_id_written_onto_response_header() {
        let handler = correlation_id(attach_settings(ok, Arc::new(RequestSettings::default())));
        let mut context = RequestContext::default();
        let request = Request::default().with_header("X-Request-Id", "req-123");
        let response = handler.handle(request, &mut context).unwrap();
        assert_eq!(response.headers().get("X-Request-Id"), Some(&"req-123".to_string()));
    }

    #[test]
    fn test_panic_recovery_returns_500() {
        let handler = PanicRecovery::new(panics);
        let mut context = RequestContext::default();
        let err = handler.handle(Request::default(), &mut context).unwrap_err();
        assert_eq!(err.status_code, 500);
    }

    #[test]
    fn test_cors_preflight_answered_directly() {
        let handler = Cors::new(ok);
        let mut context = RequestContext::default();
        context.set_settings(Arc::new(RequestSettings {
            cors: CorsSettings {
                allowed_origins: vec!["https://example.com".to_string()],
                ..CorsSettings::default()
            },
            ..RequestSettings::default()
        }));
        let mut request = Request::default()
            .with_header("origin", "https://example.com")
            .with_header("host", "localhost");
        request.method = Method::OPTIONS;
        let response = handler.handle(request, &mut context).unwrap();
        assert_eq!(response.status_code, 204);
        assert_eq!(response.headers().get("Access-Control-Allow-Origin"), Some(&"https://example.com".to_string()));
    }

    #[test]
    fn test_request_logger_skips_excluded_path() {
        let config = RequestLoggerConfig::new().exclude_path("/healthz");
        let handler = RequestLogger::new(ok, config);
        let mut context = RequestContext::default();
        let mut request = Request::default();
        request.path = "/healthz".to_string();
        handler.handle(request, &mut context).unwrap();
    }
}
