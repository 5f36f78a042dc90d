pub use crate::api::Api;
pub use crate::auth::{
    authenticate_with, ApiKeyAuth, ApiKeyLocation, AuthDescriptor, AuthError, AuthKind, AuthStrategy,
    BasicAuth, BearerAuth, SessionCookieAuth,
};
pub use crate::bind::{BindingError, Duration, FromRequestParts, ParsePrimitive, Source};
pub use crate::bind_params;
pub use crate::content::mediatypes::*;
pub use crate::content::{Deserialize, MediaType, SerializationError, Serialize};
pub use crate::context::{RequestContext, ScopedLogger};
pub use crate::docs::{group_by_tag, RouteDocs};
pub use crate::error::{ApiError, ErrorKind, FieldError};
pub use crate::handler::{Handler, Res};
pub use crate::json_engine::{JsonBody, JsonHandler, JsonPayload, JsonResponse, NoBody};
pub use crate::media_type;
pub use crate::middleware::{
    attach_settings, correlation_id, inject_logger, Cors, PanicRecovery, RequestLogger, RequestLoggerConfig,
};
pub use crate::request::{Header, Method, Param, RawRequest, Request};
pub use crate::response::{RawResponse, Response};
pub use crate::router::{RouteDescriptor, Router};
pub use crate::server::Server;
pub use crate::settings::{CorrelationIdMode, CorsSettings, FrameworkSettings, RequestSettings};
pub use crate::validate::validate;
pub use crate::ws::{self, Callbacks, WebSocketTransport, WsMessage, WsMiddleware};
