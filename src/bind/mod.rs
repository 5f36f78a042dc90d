//! Typed parameter binding (spec.md §4.A).
//!
//! Rust has no runtime reflection to walk a struct's fields the way a
//! dynamic-language binder would, so the binding plan is generated at
//! compile time instead, by [`bind_params!`] — the same
//! declarative-macro-as-code-generator trick the crate already uses for
//! `media_type!` in [`crate::content`].
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::request::{Header, Param, Request};

/// Where a bound field's raw value comes from (spec.md §3 "Binding plan").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Body => "body",
        };
        write!(f, "{}", s)
    }
}

/// Convert a raw string value into a binder target type (spec.md §9
/// "Primitive conversion table").
pub trait ParsePrimitive: Sized {
    fn parse_primitive(raw: &str) -> Result<Self, String>;
}

macro_rules! impl_parse_primitive_fromstr {
    ($($t:ty),* $(,)?) => {
        $(
            impl ParsePrimitive for $t {
                fn parse_primitive(raw: &str) -> Result<Self, String> {
                    raw.parse::<$t>().map_err(|e| e.to_string())
                }
            }
        )*
    };
}

impl_parse_primitive_fromstr!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

/// `true`/`false` case-insensitive, plus `1`/`0` (spec.md §9 "Conversion
/// rules"). `str::parse::<bool>` alone only accepts lowercase `true`/`false`.
impl ParsePrimitive for bool {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(format!("'{}' is not a valid boolean", raw)),
        }
    }
}

impl ParsePrimitive for String {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl ParsePrimitive for Uuid {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        Uuid::parse_str(raw).map_err(|e| e.to_string())
    }
}

impl ParsePrimitive for DateTime<Utc> {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| e.to_string())
    }
}

impl<T: ParsePrimitive> ParsePrimitive for Option<T> {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        T::parse_primitive(raw).map(Some)
    }
}

/// A duration parsed from a `<integer><unit>` literal, `unit` one of
/// `ns|us|ms|s|m|h` (spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl ParsePrimitive for Duration {
    fn parse_primitive(raw: &str) -> Result<Self, String> {
        let split_at = raw
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("duration '{}' is missing a unit suffix", raw))?;
        let (number, unit) = raw.split_at(split_at);
        let number: u64 = number
            .parse()
            .map_err(|_| format!("invalid duration magnitude in '{}'", raw))?;
        let duration = match unit {
            "ns" => std::time::Duration::from_nanos(number),
            "us" => std::time::Duration::from_micros(number),
            "ms" => std::time::Duration::from_millis(number),
            "s" => std::time::Duration::from_secs(number),
            "m" => std::time::Duration::from_secs(number * 60),
            "h" => std::time::Duration::from_secs(number * 3600),
            other => return Err(format!("unknown duration unit '{}'", other)),
        };
        Ok(Duration(duration))
    }
}

/// Binding failure for a single field: which field, which source it was
/// looked up in, and why conversion failed.
#[derive(Debug)]
pub struct BindingError {
    pub field: String,
    pub source: Source,
    pub reason: String,
}

impl BindingError {
    pub fn new(field: &str, source: Source, reason: impl fmt::Display) -> Self {
        Self {
            field: field.to_string(),
            source,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.source, self.reason)
    }
}

impl From<BindingError> for ApiError {
    fn from(err: BindingError) -> Self {
        ApiError::binding(&err.field, &format!("({}) {}", err.source, err.reason))
    }
}

/// A record extracted from a request's path/query/header/cookie values,
/// produced by [`bind_params!`]. Body binding goes through
/// [`crate::content::Deserialize`] instead, since the body needs full
/// content negotiation rather than a single string conversion.
pub trait FromRequestParts: Sized {
    fn from_request_parts<T>(request: &Request<T>) -> Result<Self, BindingError>;
}

/// Look up a single named value, trying each source in order and returning
/// the first hit (spec.md §4.A step 2).
pub fn find_raw<T>(request: &Request<T>, name: &str, sources: &[Source]) -> Option<String> {
    for source in sources {
        let value = match source {
            Source::Path => request.params.get_first(&Param::Path(name.to_string())).cloned(),
            Source::Query => request.params.get_first(&Param::Query(name.to_string())).cloned(),
            Source::Header => request.headers.get(&Header::new(name)).cloned(),
            Source::Cookie => request.cookies().get(name).cloned(),
            Source::Body => request.params.get_first(&Param::Body(name.to_string())).cloned(),
        };
        if value.is_some() {
            return value;
        }
    }
    None
}

/// Declare a param record and its [`FromRequestParts`] impl.
///
/// ```ignore
/// bind_params! {
///     pub struct Pagination {
///         page: query u32 = 1,
///         page_size: query u32 = 20,
///         id: path Uuid,
///     }
/// }
/// ```
#[macro_export]
macro_rules! bind_params {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $field:ident : $source:ident $ty:ty $( = $default:expr )?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $ty,)*
        }

        impl $crate::bind::FromRequestParts for $name {
            fn from_request_parts<T>(
                request: &$crate::request::Request<T>,
            ) -> ::std::result::Result<Self, $crate::bind::BindingError> {
                $(
                    let $field: $ty = $crate::bind_params!(
                        @field request, $field, $source, $ty $(, $default)?
                    );
                )*
                Ok(Self { $($field),* })
            }
        }
    };

    (@field $request:expr, $field:ident, $source:ident, $ty:ty, $default:expr) => {
        match $crate::bind::find_raw($request, stringify!($field), &[$crate::bind::Source::$source]) {
            Some(raw) => <$ty as $crate::bind::ParsePrimitive>::parse_primitive(&raw)
                .map_err(|e| $crate::bind::BindingError::new(stringify!($field), $crate::bind::Source::$source, e))?,
            None => $default,
        }
    };

    (@field $request:expr, $field:ident, $source:ident, $ty:ty) => {
        match $crate::bind::find_raw($request, stringify!($field), &[$crate::bind::Source::$source]) {
            Some(raw) => <$ty as $crate::bind::ParsePrimitive>::parse_primitive(&raw)
                .map_err(|e| $crate::bind::BindingError::new(stringify!($field), $crate::bind::Source::$source, e))?,
            None => return Err($crate::bind::BindingError::new(
                stringify!($field), $crate::bind::Source::$source, "missing required value",
            )),
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::Request;

    bind_params! {
        pub struct Pagination {
            page: query u32 = 1,
            page_size: query u32 = 20,
            tenant: path Uuid,
            cursor: query Option<String> = None,
        }
    }

    fn request_with_path_param(name: &str, value: &str) -> Request<Vec<u8>> {
        let mut request = Request::default();
        request.params.add(Param::Path(name.to_string()), value.to_string());
        request
    }

    #[test]
    fn test_defaults_apply_when_missing() {
        let tenant = Uuid::new_v4();
        let request = request_with_path_param("tenant", &tenant.to_string());
        let parsed = Pagination::from_request_parts(&request).unwrap();
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.page_size, 20);
        assert_eq!(parsed.tenant, tenant);
        assert_eq!(parsed.cursor, None);
    }

    #[test]
    fn test_overrides_and_optional_value() {
        let tenant = Uuid::new_v4();
        let mut request = request_with_path_param("tenant", &tenant.to_string());
        request.params.add(Param::Query("page".to_string()), "3".to_string());
        request.params.add(Param::Query("cursor".to_string()), "abc".to_string());
        let parsed = Pagination::from_request_parts(&request).unwrap();
        assert_eq!(parsed.page, 3);
        assert_eq!(parsed.cursor, Some("abc".to_string()));
    }

    #[test]
    fn test_missing_required_field_errors() {
        let request = Request::default();
        let err = Pagination::from_request_parts(&request).unwrap_err();
        assert_eq!(err.field, "tenant");
        assert_eq!(err.source, Source::Path);
    }

    #[test]
    fn test_bool_accepts_case_insensitive_and_digit_forms() {
        assert_eq!(bool::parse_primitive("true").unwrap(), true);
        assert_eq!(bool::parse_primitive("True").unwrap(), true);
        assert_eq!(bool::parse_primitive("TRUE").unwrap(), true);
        assert_eq!(bool::parse_primitive("1").unwrap(), true);
        assert_eq!(bool::parse_primitive("false").unwrap(), false);
        assert_eq!(bool::parse_primitive("False").unwrap(), false);
        assert_eq!(bool::parse_primitive("0").unwrap(), false);
        assert!(bool::parse_primitive("yes").is_err());
    }

    #[test]
    fn test_duration_parses_units() {
        assert_eq!(Duration::parse_primitive("30s").unwrap().0, std::time::Duration::from_secs(30));
        assert_eq!(Duration::parse_primitive("250ms").unwrap().0, std::time::Duration::from_millis(250));
        assert!(Duration::parse_primitive("30").is_err());
        assert!(Duration::parse_primitive("30xyz").is_err());
    }
}
