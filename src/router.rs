//! Path and method based request routing (spec.md §4.G).
use crate::auth::AuthDescriptor;
use crate::context::RequestContext;
use crate::docs::RouteDocs;
use crate::error::{self, ApiError};
use crate::handler::{Handler, Res};
use crate::request::{Method, Param, Request};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RoutePart {
    Exact(String),
    Param(String),
    Any,
}

impl RoutePart {
    fn from_str(s: &str) -> Self {
        if s == "*" {
            Self::Any
        } else if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Self::Param(name.to_string())
        } else {
            Self::Exact(s.to_string())
        }
    }
    fn matches(&self, s: &str) -> (bool, Option<(String, String)>) {
        match self {
            Self::Exact(p) => (s == &p[..], None),
            Self::Any => (true, None),
            Self::Param(p) => (true, Some((p.clone(), s.to_string()))),
        }
    }
}

struct RoutePath {
    raw: String,
    parts: Vec<RoutePart>,
    is_prefix: bool,
}

impl RoutePath {
    fn from_str(s: &str) -> Self {
        let mut route_parts = vec![];
        let mut is_prefix = false;
        let parts = match s.ends_with("**") {
            true => {
                is_prefix = true;
                s[..s.len() - 2].split('/')
            }
            false => s.split('/'),
        };
        for part in parts {
            route_parts.push(RoutePart::from_str(part));
        }
        Self {
            raw: s.to_string(),
            parts: route_parts,
            is_prefix,
        }
    }
    fn matches(&self, s: &str) -> (bool, Vec<(String, String)>) {
        let parts: Vec<&str> = s.split('/').collect();
        let mut params = vec![];

        if parts.len() < self.parts.len() {
            return (false, params);
        }
        if parts.len() > self.parts.len() && !self.is_prefix {
            return (false, params);
        }
        for (i, part) in parts.iter().enumerate() {
            let (matches, param) = self.parts[i].matches(part);
            if !matches {
                return (false, params);
            }
            if let Some((name, val)) = param {
                params.push((name, val));
            }
        }
        (true, params)
    }
}

/// Documentation/negotiation metadata for a registered route, independent
/// of its handler's concrete types (spec.md §3 "Route descriptor").
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    pub pattern: String,
    pub consumes: Option<String>,
    pub produces: Option<String>,
    pub auth: Option<AuthDescriptor>,
    pub docs: Option<RouteDocs>,
}

struct Route<I, O, E, C> {
    method: Method,
    path: RoutePath,
    // Use boxdyn cause I can't have a type parameter H for handler, because
    // Router must hold Vec<Route> for heterogenous H.
    handler: Box<dyn Handler<I, O, E, C>>,
    descriptor: RouteDescriptor,
}

/// Router is a Handler which dispatches requests to any number of other
/// Handlers based on the request path and method.
///
/// # Usage - route patterns
/// * `/foo`: matches exactly /foo
/// * `/foo/*/bar`: matches /foo/anything/bar
/// * `/foo/**`: matches /foo/bar/... (only at end of route)
/// * `/foo/{name}`: matches /foo/bar, adds name="bar" to request.params
///
/// A path matching no registered method yields `405`; a path matching no
/// route at all yields `404` (spec.md §4.G edge cases). Both use the
/// canonical error body. Registering the same `(method, pattern)` pair
/// twice panics at build time rather than silently shadowing a route.
///
/// # Example
/// ```
/// use tyhttp::prelude::*;
/// use tyhttp::router::Router;
///
/// fn handle_hello(req: RawRequest, _context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
///     Ok(Response::new(200).with_payload(b"Hello!".to_vec()))
/// }
///
/// fn handle_bye(req: RawRequest, _context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
///     Ok(Response::new(200).with_payload(b"Bye!".to_vec()))
/// }
///
/// let router = Router::new()
///    .with_route(Method::GET, "/hello", handle_hello)
///    .with_route(Method::GET, "/bye", handle_bye);
///
/// let mut req_hello = Request::default();
/// req_hello.path = "/hello".to_string();
/// let response_hello = router.handle(req_hello, &mut RequestContext::default()).unwrap();
/// # assert_eq!(response_hello.payload, Some(b"Hello!".to_vec()));
///
/// let mut req_missing = Request::default();
/// req_missing.path = "/nope".to_string();
/// # assert_eq!(router.handle(req_missing, &mut RequestContext::default()).unwrap_err().status_code, 404);
/// ```
pub struct Router<I, O, E, C> {
    routes: Vec<Route<I, O, E, C>>,
}

impl<I: 'static + Sync, O: 'static + Sync, E: 'static + Sync, C> Router<I, O, E, C> {
    pub fn new() -> Self {
        Self { routes: vec![] }
    }

    /// Register a handler for `method`/`path`. Panics if this
    /// `(method, pattern)` pair is already registered (spec.md §4.G
    /// "Route uniqueness").
    pub fn with_route<H>(mut self, method: Method, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        if self.routes.iter().any(|r| r.method == method && r.path.raw == path) {
            panic!("duplicate route registered: {} {}", method, path);
        }
        self.routes.push(Route {
            method,
            path: RoutePath::from_str(path),
            handler: Box::new(handler),
            descriptor: RouteDescriptor {
                method,
                pattern: path.to_string(),
                consumes: None,
                produces: None,
                auth: None,
                docs: None,
            },
        });
        self
    }

    pub fn get<H>(self, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        self.with_route(Method::GET, path, handler)
    }
    pub fn post<H>(self, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        self.with_route(Method::POST, path, handler)
    }
    pub fn put<H>(self, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        self.with_route(Method::PUT, path, handler)
    }
    pub fn patch<H>(self, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        self.with_route(Method::PATCH, path, handler)
    }
    pub fn delete<H>(self, path: &str, handler: H) -> Self
    where
        H: 'static + Handler<I, O, E, C>,
    {
        self.with_route(Method::DELETE, path, handler)
    }

    /// Attach documentation tags to the most recently registered route.
    pub fn with_docs(mut self, docs: RouteDocs) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.descriptor.docs = Some(docs);
        }
        self
    }

    /// Attach an auth descriptor to the most recently registered route.
    pub fn with_auth_descriptor(mut self, auth: AuthDescriptor) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.descriptor.auth = Some(auth);
        }
        self
    }

    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        self.routes.iter().map(|r| r.descriptor.clone()).collect()
    }
}

impl<I: 'static + Sync, O: 'static + Sync, E: 'static + Sync, C> Default for Router<I, O, E, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch is bound to the raw byte pipeline and [`RequestContext`], like
/// [`crate::json_engine::JsonHandler`] and
/// [`crate::middleware::PanicRecovery`], because the 404/405 responses it
/// writes itself go through [`crate::error::write_error`] and need a
/// correlation id off the context.
impl Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> for Router<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> {
    fn handle(&self, mut request: Request<Vec<u8>>, context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        let mut path_matched = false;
        for route in &self.routes {
            let (matches, params) = route.path.matches(&request.path);
            if matches {
                path_matched = true;
                if route.method == request.method {
                    for (name, val) in params {
                        request.params.add(Param::Path(name), val)
                    }
                    return route.handler.handle(request, context);
                }
            }
        }
        let request_id = context.correlation_id().map(|s| s.to_string());
        if path_matched {
            Err(error::write_error(&request, request_id.as_deref(), ApiError::method_not_allowed()))
        } else {
            Err(error::write_error(&request, request_id.as_deref(), ApiError::not_found()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ok(_req: Request<Vec<u8>>, _ctx: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        Ok(Response::new(200))
    }

    #[test]
    fn test_named_segment_binds_param() {
        let router = Router::new().get("/users/{id}", ok);
        let mut request = Request::default();
        request.path = "/users/42".to_string();
        router.handle(request.clone(), &mut RequestContext::default()).unwrap();
        let (matches, params) = RoutePath::from_str("/users/{id}").matches(&request.path);
        assert!(matches);
        assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_unmatched_path_is_404() {
        let router: Router<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> = Router::new().get("/users/{id}", ok);
        let mut request = Request::default();
        request.path = "/nope".to_string();
        let err = router.handle(request, &mut RequestContext::default()).unwrap_err();
        assert_eq!(err.status_code, 404);
    }

    #[test]
    fn test_matched_path_wrong_method_is_405() {
        let router = Router::new().get("/users/{id}", ok);
        let mut request = Request::default();
        request.method = Method::POST;
        request.path = "/users/42".to_string();
        let err = router.handle(request, &mut RequestContext::default()).unwrap_err();
        assert_eq!(err.status_code, 405);
    }

    #[test]
    #[should_panic(expected = "duplicate route registered")]
    fn test_duplicate_route_panics() {
        Router::new().get("/users/{id}", ok).get("/users/{id}", ok);
    }
}
