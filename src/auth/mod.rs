//! Authentication strategies (spec.md §4.F).
//!
//! [`Authenticator`] is the teacher's own wrapper handler: it runs a closure
//! before delegating to the inner handler. Adapted from the teacher's
//! original (which turned any failure into a bare 401) to write the
//! canonical error body instead (spec.md §7 scenario #5), so it is bound to
//! the raw byte pipeline and [`RequestContext`] like the other pieces that
//! call [`crate::error::write_error`]. The strategies below are just named,
//! reusable ways to build the auth closure, each producing a typed
//! principal attached to [`RequestContext`](crate::context::RequestContext).
use crate::bind::Source;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handler::{Handler, Res};
use crate::request::Request;

pub mod apikey;
pub mod basic;
pub mod bearer;
pub mod session;

pub use apikey::{ApiKeyAuth, ApiKeyLocation};
pub use basic::BasicAuth;
pub use bearer::BearerAuth;
pub use session::SessionCookieAuth;

#[derive(Debug)]
pub struct AuthError {
    reason: String,
}

impl AuthError {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

pub struct Authenticator<F, H> {
    handler: H,
    fauth: F,
}

impl<F, H> Authenticator<F, H> {
    pub fn new(fauth: F, handler: H) -> Self {
        Self { handler, fauth }
    }
}

impl<F, H> Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> for Authenticator<F, H>
where
    F: Fn(&Request<Vec<u8>>, &mut RequestContext) -> Result<(), AuthError> + 'static + Send + Sync,
    H: Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext>,
{
    fn handle(&self, request: Request<Vec<u8>>, context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        match (self.fauth)(&request, context) {
            Ok(()) => self.handler.handle(request, context),
            Err(err) => {
                let request_id = context.correlation_id().map(|s| s.to_string());
                Err(crate::error::write_error(
                    &request,
                    request_id.as_deref(),
                    ApiError::authentication(&err.to_string()),
                ))
            }
        }
    }
}

/// What kind of credential a strategy verifies (spec.md §6 "Auth strategy
/// descriptors"), used by documentation generation rather than by the
/// runtime path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Basic,
    Bearer,
    ApiKey,
    Session,
}

/// Doc-gen metadata describing where a strategy expects its credential.
#[derive(Debug, Clone)]
pub struct AuthDescriptor {
    pub scheme: &'static str,
    pub kind: AuthKind,
    pub location: Source,
    pub field: String,
}

/// Extract and verify a credential, producing a typed principal on success
/// (spec.md §4.F). Implementors only need to know how to pull the raw
/// credential out of the request and hand it to their verifier; attaching
/// the result to the context is handled once, in [`authenticate_with`].
pub trait AuthStrategy: Send + Sync {
    type Principal: 'static + Send + Sync;

    fn extract<T>(&self, request: &Request<T>) -> Result<Self::Principal, AuthError>;
    fn descriptor(&self) -> AuthDescriptor;
}

/// Wrap `handler` so it only runs once `strategy` has verified the request,
/// attaching the resulting principal to the [`RequestContext`] (readable
/// later via `context.principal::<P>()`).
pub fn authenticate_with<H, S>(
    handler: H,
    strategy: S,
) -> Authenticator<impl Fn(&Request<Vec<u8>>, &mut RequestContext) -> Result<(), AuthError> + Send + Sync + 'static, H>
where
    S: AuthStrategy + 'static,
    H: Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext>,
{
    Authenticator::new(
        move |request: &Request<Vec<u8>>, context: &mut RequestContext| {
            let principal = strategy.extract(request)?;
            context.set_principal(principal);
            Ok(())
        },
        handler,
    )
}
