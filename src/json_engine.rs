//! The JSON request/response engine (spec.md §4.H), gluing the binder
//! (§4.A), the validator (§4.B) and the error writer (§4.C) into one
//! [`Handler`] that a route registers directly.
//!
//! Authentication (§4.H step 4) is not embedded here: it composes from the
//! outside, the same way every other cross-cutting concern in this crate
//! does, by wrapping a [`JsonHandler`] in [`crate::auth::authenticate_with`]
//! or [`Handler::authenticated`]. One consequence worth naming: because the
//! wrapper runs before the wrapped handler, auth verification actually runs
//! *before* this engine's own bind/decode/validate steps rather than
//! between them and the user handler as §4.H's numbered list suggests. Both
//! orderings require every step to succeed before the user handler runs, so
//! the observable behavior only differs in which error surfaces first when
//! more than one step would fail; see DESIGN.md.
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::bind::FromRequestParts;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::handler::{Handler, Res};
use crate::request::Request;
use crate::response::Response;

/// Stand-in for "no body" (spec.md §4.H step 2: "skip if `B` is the unit
/// type"). Rust's `()` can't be given our own trait impls from outside this
/// crate's blanket `JsonBody`/`JsonPayload` impls without specialization, so
/// routes that take or return nothing use this instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBody;

/// A request body type the JSON engine knows how to decode and validate.
/// Implemented once, generically, for every `DeserializeOwned + Validate +
/// Default` type, plus a manual impl for [`NoBody`].
pub trait JsonBody: Sized {
    const IS_UNIT: bool = false;
    /// `allow_unknown_fields` mirrors `RequestSettings.allow_unknown_fields`
    /// (spec.md §4.A "Body decoding"): when false, a JSON object field with
    /// no matching struct field fails decoding instead of being dropped.
    fn decode(bytes: Option<&[u8]>, allow_unknown_fields: bool) -> Result<Self, ApiError>;
    fn validate_self(&self) -> Vec<crate::error::FieldError>;
}

impl JsonBody for NoBody {
    const IS_UNIT: bool = true;
    fn decode(_bytes: Option<&[u8]>, _allow_unknown_fields: bool) -> Result<Self, ApiError> {
        Ok(NoBody)
    }
    fn validate_self(&self) -> Vec<crate::error::FieldError> {
        Vec::new()
    }
}

impl<T> JsonBody for T
where
    T: DeserializeOwned + Validate + Default,
{
    fn decode(bytes: Option<&[u8]>, allow_unknown_fields: bool) -> Result<Self, ApiError> {
        let bytes = match bytes {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(Self::default()),
        };
        if allow_unknown_fields {
            return serde_json::from_slice(bytes).map_err(|e| ApiError::malformed_body(true, &e.to_string()));
        }
        // serde_ignored reports every JSON path serde's derived Deserialize
        // skips, regardless of whether T itself declares
        // #[serde(deny_unknown_fields)] -- this is what lets a single
        // runtime flag toggle strictness for any body type.
        let mut unknown_field = None;
        let de = &mut serde_json::Deserializer::from_slice(bytes);
        let value: Self = serde_ignored::deserialize(de, |path| {
            if unknown_field.is_none() {
                unknown_field = Some(path.to_string());
            }
        })
        .map_err(|e| ApiError::malformed_body(true, &e.to_string()))?;
        match unknown_field {
            Some(field) => Err(ApiError::validation(vec![crate::error::FieldError::new(
                &field,
                &format!("unknown field: {}", field),
            )
            .with_rule("unknown_field")])),
            None => Ok(value),
        }
    }
    fn validate_self(&self) -> Vec<crate::error::FieldError> {
        crate::validate::validate(self)
    }
}

/// A response body type the JSON engine knows how to encode, with a default
/// success status that depends on whether it carries a body at all (spec.md
/// §4.H step 6: `200` with a body, `204` for the unit body).
pub trait JsonPayload: Sized {
    const IS_UNIT: bool = false;
    fn encode(&self) -> Result<Vec<u8>, ApiError>;
}

impl JsonPayload for NoBody {
    const IS_UNIT: bool = true;
    fn encode(&self) -> Result<Vec<u8>, ApiError> {
        Ok(Vec::new())
    }
}

impl<T: Serialize> JsonPayload for T {
    fn encode(&self) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(self).map_err(ApiError::internal)
    }
}

/// What a JSON handler returns: the typed body plus the overrides spec.md
/// §4.H step 6 says a handler is allowed to set directly ("status, headers,
/// cookies, body") rather than always taking the engine's default.
pub struct JsonResponse<R> {
    body: R,
    status: Option<u16>,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String, String)>,
}

impl<R> JsonResponse<R> {
    pub fn new(body: R) -> Self {
        Self {
            body,
            status: None,
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
    pub fn with_cookie(mut self, name: &str, value: &str, attrs: &str) -> Self {
        self.cookies.push((name.to_string(), value.to_string(), attrs.to_string()));
        self
    }
}

impl<R> From<R> for JsonResponse<R> {
    fn from(body: R) -> Self {
        Self::new(body)
    }
}

/// A JSON route handler: typed params `P`, typed body `B`, typed success
/// body `R`, wrapped as a [`Handler`] over the raw byte request/response
/// types every route is ultimately registered with.
pub struct JsonHandler<P, B, R, F> {
    f: F,
    default_status: Option<u16>,
    _marker: PhantomData<(P, B, R)>,
}

impl<P, B, R, F> JsonHandler<P, B, R, F>
where
    P: FromRequestParts,
    B: JsonBody,
    R: JsonPayload,
    F: Fn(&mut RequestContext, P, B) -> Result<JsonResponse<R>, ApiError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            default_status: None,
            _marker: PhantomData,
        }
    }

    /// Override the default success status this engine would otherwise
    /// pick from `R::IS_UNIT` (spec.md §4.H step 6 "@StatusCode metadata
    /// tag"). A status set on the returned [`JsonResponse`] still wins.
    pub fn with_default_status(mut self, status: u16) -> Self {
        self.default_status = Some(status);
        self
    }

    fn write_success(&self, response: JsonResponse<R>) -> Result<Response<Vec<u8>>, ApiError> {
        let default_status = if R::IS_UNIT { 204 } else { 200 };
        let status = response.status.or(self.default_status).unwrap_or(default_status);
        let mut out = Response::new(status);
        for (name, value) in &response.headers {
            out = out.with_header(name, value);
        }
        for (name, value, attrs) in &response.cookies {
            out = out.with_cookie(name, value, attrs);
        }
        if !R::IS_UNIT {
            let bytes = response.body.encode()?;
            if !bytes.is_empty() {
                out = out.with_payload(bytes).with_header("Content-Type", "application/json");
            }
        }
        Ok(out)
    }
}

impl<P, B, R, F> Handler<Vec<u8>, Vec<u8>, Vec<u8>, RequestContext> for JsonHandler<P, B, R, F>
where
    P: 'static + Sync + FromRequestParts,
    B: 'static + Sync + JsonBody,
    R: 'static + Sync + JsonPayload,
    F: Fn(&mut RequestContext, P, B) -> Result<JsonResponse<R>, ApiError> + Send + Sync,
{
    fn handle(&self, request: Request<Vec<u8>>, context: &mut RequestContext) -> Res<Vec<u8>, Vec<u8>> {
        let request_id = context.correlation_id().map(|s| s.to_string());

        // Step 1: bind params.
        let params = match P::from_request_parts(&request) {
            Ok(params) => params,
            Err(err) => return Err(crate::error::write_error(&request, request_id.as_deref(), err.into())),
        };

        // Step 2: decode body, skipped internally when B == NoBody.
        let allow_unknown_fields = context.settings().allow_unknown_fields;
        let body = match B::decode(request.payload.as_deref(), allow_unknown_fields) {
            Ok(body) => body,
            Err(err) => return Err(crate::error::write_error(&request, request_id.as_deref(), err)),
        };

        // Step 3: validate the body. (Param validation happens structurally
        // at bind time in step 1; see the module doc comment.)
        let errors = body.validate_self();
        if !errors.is_empty() {
            return Err(crate::error::write_error(
                &request,
                request_id.as_deref(),
                ApiError::validation(errors),
            ));
        }

        // Step 5: invoke the user handler exactly once.
        let json_response = match (self.f)(context, params, body) {
            Ok(json_response) => json_response,
            Err(err) => return Err(crate::error::write_error(&request, request_id.as_deref(), err)),
        };

        // Step 6: write the response.
        match self.write_success(json_response) {
            Ok(response) => Ok(response),
            Err(err) => Err(crate::error::write_error(&request, request_id.as_deref(), err)),
        }
    }
}

crate::bind_params! {
    /// Params record for routes that bind nothing from the path/query/
    /// header/cookie (every field comes from the body instead).
    pub struct NoParams {}
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
    struct CreateUser {
        #[validate(length(min = 1, message = "name must not be empty"))]
        name: String,
    }

    #[derive(Debug, Clone, Serialize)]
    struct UserView {
        name: String,
    }

    fn request_with_body(bytes: &[u8]) -> Request<Vec<u8>> {
        let mut request = Request::default();
        request.payload = Some(bytes.to_vec());
        request
    }

    #[test]
    fn test_happy_path_defaults_to_200() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }))
            });
        let mut context = RequestContext::default();
        let request = request_with_body(br#"{"name":"Ada"}"#);
        let response = handler.handle(request, &mut context).unwrap();
        assert_eq!(response.status_code, 200);
        let body: serde_json::Value = serde_json::from_slice(&response.payload.unwrap()).unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[test]
    fn test_validation_failure_is_400() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }))
            });
        let mut context = RequestContext::default();
        let request = request_with_body(br#"{"name":""}"#);
        let err = handler.handle(request, &mut context).unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn test_malformed_body_is_400() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }))
            });
        let mut context = RequestContext::default();
        let request = request_with_body(b"not json");
        let err = handler.handle(request, &mut context).unwrap_err();
        assert_eq!(err.status_code, 400);
    }

    #[test]
    fn test_unknown_field_rejected_in_strict_mode() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }))
            });
        let mut context = RequestContext::default();
        let request = request_with_body(br#"{"name":"Ada","extra":1}"#);
        let err = handler.handle(request, &mut context).unwrap_err();
        assert_eq!(err.status_code, 400);
        let body: serde_json::Value = serde_json::from_slice(&err.payload.unwrap()).unwrap();
        assert_eq!(body["details"][0]["field"], "extra");
    }

    #[test]
    fn test_unknown_field_allowed_when_setting_permits() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }))
            });
        let mut settings = crate::settings::FrameworkSettings::default();
        settings.request.allow_unknown_fields = true;
        let mut context = RequestContext::default();
        context.set_settings(settings.request_settings());
        let request = request_with_body(br#"{"name":"Ada","extra":1}"#);
        let response = handler.handle(request, &mut context).unwrap();
        assert_eq!(response.status_code, 200);
    }

    #[test]
    fn test_unit_body_defaults_to_204() {
        let handler: JsonHandler<NoParams, NoBody, NoBody, _> =
            JsonHandler::new(|_ctx, _params, _body: NoBody| Ok(JsonResponse::new(NoBody)));
        let mut context = RequestContext::default();
        let response = handler.handle(Request::default(), &mut context).unwrap();
        assert_eq!(response.status_code, 204);
        assert!(response.payload.is_none());
    }

    #[test]
    fn test_custom_status_overrides_default() {
        let handler: JsonHandler<NoParams, CreateUser, UserView, _> =
            JsonHandler::new(|_ctx, _params, body: CreateUser| {
                Ok(JsonResponse::new(UserView { name: body.name }).with_status(201))
            });
        let mut context = RequestContext::default();
        let request = request_with_body(br#"{"name":"Ada"}"#);
        let response = handler.handle(request, &mut context).unwrap();
        assert_eq!(response.status_code, 201);
    }
}
