//! HTTP Basic authentication (RFC 7617).
use std::marker::PhantomData;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::auth::{AuthDescriptor, AuthError, AuthKind, AuthStrategy};
use crate::bind::Source;
use crate::request::{Header, Request};

/// Verifies a `Authorization: Basic <base64(user:pass)>` header against a
/// user-supplied function, producing a principal `P` on success.
pub struct BasicAuth<P, F> {
    verify: F,
    _principal: PhantomData<fn() -> P>,
}

impl<P, F> BasicAuth<P, F>
where
    F: Fn(&str, &str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    pub fn new(verify: F) -> Self {
        Self {
            verify,
            _principal: PhantomData,
        }
    }
}

impl<P, F> AuthStrategy for BasicAuth<P, F>
where
    F: Fn(&str, &str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    type Principal = P;

    fn extract<T>(&self, request: &Request<T>) -> Result<P, AuthError> {
        let header = request
            .headers
            .get(&Header::new("authorization"))
            .ok_or_else(|| AuthError::new("missing Authorization header"))?;
        let encoded = header
            .strip_prefix("Basic ")
            .ok_or_else(|| AuthError::new("expected Basic auth scheme"))?;
        let decoded = BASE64
            .decode(encoded)
            .map_err(|_| AuthError::new("invalid base64 in Authorization header"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AuthError::new("invalid utf8 in Authorization header"))?;
        let (user, pass) = decoded
            .split_once(':')
            .ok_or_else(|| AuthError::new("malformed basic auth credentials"))?;
        (self.verify)(user, pass).ok_or_else(|| AuthError::new("invalid credentials"))
    }

    fn descriptor(&self) -> AuthDescriptor {
        AuthDescriptor {
            scheme: "Basic",
            kind: AuthKind::Basic,
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
    fn test_valid_credentials() {
        let strategy = BasicAuth::new(|user: &str, pass: &str| {
            if user == "alice" && pass == "hunter2" {
                Some(user.to_string())
            } else {
                None
            }
        });
        let request: Request<Vec<u8>> = Request::default()
            .with_header("authorization", &format!("Basic {}", BASE64.encode("alice:hunter2")));
        assert_eq!(strategy.extract(&request).unwrap(), "alice");
    }

    #[test]
    fn test_wrong_password_rejected() {
        let strategy = BasicAuth::new(|user: &str, pass: &str| {
            (user == "alice" && pass == "hunter2").then(|| user.to_string())
        });
        let request: Request<Vec<u8>> = Request::default()
            .with_header("authorization", &format!("Basic {}", BASE64.encode("alice:wrong")));
        assert!(strategy.extract(&request).is_err());
    }

    #[test]
    fn test_missing_header_rejected() {
        let strategy = BasicAuth::new(|_: &str, _: &str| Some(()));
        let request: Request<Vec<u8>> = Request::default();
        assert!(strategy.extract(&request).is_err());
    }
}
