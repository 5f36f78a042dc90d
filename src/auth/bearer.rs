//! Bearer token authentication (RFC 6750).
use std::marker::PhantomData;

use crate::auth::{AuthDescriptor, AuthError, AuthKind, AuthStrategy};
use crate::bind::Source;
use crate::request::{Header, Request};

/// Verifies a `Authorization: Bearer <token>` header against a
/// user-supplied function, producing a principal `P` on success.
pub struct BearerAuth<P, F> {
    verify: F,
    _principal: PhantomData<fn() -> P>,
}

impl<P, F> BearerAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    pub fn new(verify: F) -> Self {
        Self {
            verify,
            _principal: PhantomData,
        }
    }
}

impl<P, F> AuthStrategy for BearerAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    type Principal = P;

    fn extract<T>(&self, request: &Request<T>) -> Result<P, AuthError> {
        let header = request
            .headers
            .get(&Header::new("authorization"))
            .ok_or_else(|| AuthError::new("missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AuthError::new("expected Bearer auth scheme"))?;
        (self.verify)(token).ok_or_else(|| AuthError::new("invalid or expired token"))
    }

    fn descriptor(&self) -> AuthDescriptor {
        AuthDescriptor {
            scheme: "Bearer",
            kind: AuthKind::Bearer,
            location: Source::Header,
            field: "Authorization".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    #[test]
    fn test_valid_token() {
        let strategy = BearerAuth::new(|token: &str| (token == "abc123").then(|| "svc-account".to_string()));
        let request: Request<Vec<u8>> = Request::default().with_header("authorization", "Bearer abc123");
        assert_eq!(strategy.extract(&request).unwrap(), "svc-account");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let strategy = BearerAuth::new(|token: &str| (token == "abc123").then(|| ()));
        let request: Request<Vec<u8>> = Request::default().with_header("authorization", "Bearer wrong");
        assert!(strategy.extract(&request).is_err());
    }
}
