//! Framework settings (spec.md §6 "Settings (enumerated)").
//!
//! Loading these from the environment or a config file is an explicit
//! non-goal (spec.md §1): the core only owns the value types and a builder,
//! the same way the teacher's `TcpServer::new` takes already-resolved
//! arguments rather than reading the environment itself. An embedding
//! application is expected to populate a `FrameworkSettings` however it
//! likes (a name-mangled env var per spec.md §6, a config file, CLI flags)
//! and hand the finished value to the settings-attach middleware.
use std::sync::Arc;

/// How the correlation id middleware sources the per-request id (spec.md
/// §3 "Correlation id").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationIdMode {
    /// Reuse the inbound header if present and non-empty, else generate.
    AcceptFromHeader,
    /// Always generate a fresh id, ignoring any inbound header.
    AlwaysGenerate,
}

impl Default for CorrelationIdMode {
    fn default() -> Self {
        Self::AcceptFromHeader
    }
}

/// CORS configuration (spec.md §6 `cors.*`).
#[derive(Debug, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_methods: vec![
                "GET".into(),
                "POST".into(),
                "PUT".into(),
                "PATCH".into(),
                "DELETE".into(),
                "OPTIONS".into(),
            ],
            allowed_headers: vec!["Content-Type".into(), "Authorization".into()],
            allow_credentials: false,
        }
    }
}

impl CorsSettings {
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == "*" || o == origin)
    }
}

/// `request.*` settings (spec.md §6), attached to every `RequestContext` by
/// the settings-attach middleware (spec.md §4.E item 1).
#[derive(Debug, Clone)]
pub struct RequestSettings {
    pub allow_unknown_fields: bool,
    pub log_request_body: bool,
    pub request_id_mode: CorrelationIdMode,
    pub request_id_header: String,
    pub cors: CorsSettings,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            allow_unknown_fields: false,
            log_request_body: false,
            request_id_mode: CorrelationIdMode::default(),
            request_id_header: "X-Request-Id".to_string(),
            cors: CorsSettings::default(),
        }
    }
}

/// `server.*` settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9999,
        }
    }
}

/// `docs.*` settings. The document generator itself is an external
/// collaborator (spec.md §1); these are just the knobs it reads.
#[derive(Debug, Clone, Default)]
pub struct DocsSettings {
    pub generate: bool,
    pub mount: bool,
    pub ui_path: String,
    pub openapi_file_path: String,
}

/// `application.*` settings.
#[derive(Debug, Clone, Default)]
pub struct ApplicationSettings {
    pub name: String,
    pub version: String,
}

/// `telemetry.*` settings. Telemetry SDK wiring is out of scope (spec.md
/// §1); this only records whether the optional span middleware should run.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySettings {
    pub enabled: bool,
}

/// The full, process-wide settings object, fixed at bootstrap and read-only
/// afterward (spec.md §5 "Shared resources").
#[derive(Debug, Clone, Default)]
pub struct FrameworkSettings {
    pub server: ServerSettings,
    pub request: RequestSettings,
    pub docs: DocsSettings,
    pub application: ApplicationSettings,
    pub telemetry: TelemetrySettings,
}

impl FrameworkSettings {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn request_settings(&self) -> Arc<RequestSettings> {
        Arc::new(self.request.clone())
    }
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.server.host = host.into();
        self
    }
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }
    pub fn with_request_id_header(mut self, header: impl Into<String>) -> Self {
        self.request.request_id_header = header.into();
        self
    }
    pub fn with_request_id_mode(mut self, mode: CorrelationIdMode) -> Self {
        self.request.request_id_mode = mode;
        self
    }
    pub fn with_allow_unknown_fields(mut self, allow: bool) -> Self {
        self.request.allow_unknown_fields = allow;
        self
    }
    pub fn with_cors(mut self, cors: CorsSettings) -> Self {
        self.request.cors = cors;
        self
    }
    pub fn with_application(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.application = ApplicationSettings {
            name: name.into(),
            version: version.into(),
        };
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_match_spec() {
        let settings = FrameworkSettings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9999);
        assert!(!settings.request.allow_unknown_fields);
        assert!(!settings.request.log_request_body);
        assert_eq!(settings.request.request_id_mode, CorrelationIdMode::AcceptFromHeader);
    }

    #[test]
    fn test_cors_allows_origin() {
        let cors = CorsSettings {
            allowed_origins: vec!["https://example.com".to_string()],
            ..CorsSettings::default()
        };
        assert!(cors.allows_origin("https://example.com"));
        assert!(!cors.allows_origin("https://evil.example"));
    }

    #[test]
    fn test_builder() {
        let settings = FrameworkSettings::new()
            .with_port(8080)
            .with_request_id_header("X-Trace-Id");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.request.request_id_header, "X-Trace-Id");
    }
}
