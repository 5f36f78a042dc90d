//! API key authentication, read from a header, query parameter, or cookie.
use std::marker::PhantomData;

use crate::auth::{AuthDescriptor, AuthError, AuthKind, AuthStrategy};
use crate::bind::{find_raw, Source};
use crate::request::Request;

/// Where the API key travels on the wire.
#[derive(Debug, Clone)]
pub enum ApiKeyLocation {
    Header(String),
    Query(String),
    Cookie(String),
}

impl ApiKeyLocation {
    fn field_name(&self) -> &str {
        match self {
            Self::Header(name) | Self::Query(name) | Self::Cookie(name) => name,
        }
    }
    fn source(&self) -> Source {
        match self {
            Self::Header(_) => Source::Header,
            Self::Query(_) => Source::Query,
            Self::Cookie(_) => Source::Cookie,
        }
    }
}

/// Verifies an API key found at `location` against a user-supplied
/// function, producing a principal `P` on success.
pub struct ApiKeyAuth<P, F> {
    location: ApiKeyLocation,
    verify: F,
    _principal: PhantomData<fn() -> P>,
}

impl<P, F> ApiKeyAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    pub fn new(location: ApiKeyLocation, verify: F) -> Self {
        Self {
            location,
            verify,
            _principal: PhantomData,
        }
    }
}

impl<P, F> AuthStrategy for ApiKeyAuth<P, F>
where
    F: Fn(&str) -> Option<P> + Send + Sync,
    P: 'static + Send + Sync,
{
    type Principal = P;

    fn extract<T>(&self, request: &Request<T>) -> Result<P, AuthError> {
        let raw = find_raw(request, self.location.field_name(), &[self.location.source()])
            .ok_or_else(|| AuthError::new("missing API key"))?;
        (self.verify)(&raw).ok_or_else(|| AuthError::new("invalid API key"))
    }

    fn descriptor(&self) -> AuthDescriptor {
        AuthDescriptor {
            scheme: "ApiKey",
            kind: AuthKind::ApiKey,
            location: self.location.source(),
            field: self.location.field_name().to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::{Param, Request};

    #[test]
    fn test_key_from_header() {
        let strategy = ApiKeyAuth::new(
            ApiKeyLocation::Header("X-Api-Key".to_string()),
            |key: &str| (key == "secret").then(|| "service".to_string()),
        );
        let request: Request<Vec<u8>> = Request::default().with_header("X-Api-Key", "secret");
        assert_eq!(strategy.extract(&request).unwrap(), "service");
    }

    #[test]
    fn test_key_from_query() {
        let strategy = ApiKeyAuth::new(
            ApiKeyLocation::Query("api_key".to_string()),
            |key: &str| (key == "secret").then(|| ()),
        );
        let mut request: Request<Vec<u8>> = Request::default();
        request.params.add(Param::Query("api_key".to_string()), "secret".to_string());
        assert!(strategy.extract(&request).is_ok());
    }

    #[test]
    fn test_missing_key_rejected() {
        let strategy = ApiKeyAuth::new(ApiKeyLocation::Header("X-Api-Key".to_string()), |_: &str| Some(()));
        let request: Request<Vec<u8>> = Request::default();
        assert!(strategy.extract(&request).is_err());
    }
}
