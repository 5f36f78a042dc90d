//! Session-cookie authentication.
use std::marker::PhantomData;

use crate::auth::{AuthDescriptor, AuthError, AuthKind, AuthStrategy};
use crate::bind::Source;
use crate::request::Request;

/// Verifies a session cookie against a user-supplied lookup function
/// (typically backed by a session store), producing a principal `P` on
/// success.
pub struct SessionCookieAuth<P, F> {
    cookie_name: String,
    verify: F,
    _principal: PhantomData<fn() -> P>,
}

impl<P, F> SessionCookieAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    pub fn new(cookie_name: impl Into<String>, verify: F) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            verify,
            _principal: PhantomData,
        }
    }
}

impl<P, F> AuthStrategy for SessionCookieAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    type Principal = P;

    fn extract<T>(&self, request: &Request<T>) -> Result<P, AuthError> {
        let cookies = request.cookies();
        let session_id = cookies
            .get(&self.cookie_name)
            .ok_or_else(|| AuthError::new("missing session cookie"))?;
        (self.verify)(session_id).ok_or_else(|| AuthError::new("invalid or expired session"))
    }

    fn descriptor(&self) -> AuthDescriptor {
        AuthDescriptor {
            scheme: "Session",
            kind: AuthKind::Session,
            location: Source::Cookie,
            field: self.cookie_name.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    #[test]
    fn test_valid_session() {
        let strategy = SessionCookieAuth::new("sid", |id: &str| (id == "abc").then(|| "alice".to_string()));
        let request: Request<Vec<u8>> = Request::default().with_header("cookie", "sid=abc; theme=dark");
        assert_eq!(strategy.extract(&request).unwrap(), "alice");
    }

    #[test]
    fn test_missing_cookie_rejected() {
        let strategy = SessionCookieAuth::new("sid", |_: &str| Some(()));
        let request: Request<Vec<u8>> = Request::default();
        assert!(strategy.extract(&request).is_err());
    }
}
