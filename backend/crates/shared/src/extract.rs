//! Envelope-aware request extractors
//!
//! Drop-in replacements for `axum::Json` and `axum::extract::Path`. A body
//! or path parameter that fails to decode is rejected as a VALIDATION
//! [`AppError`] naming the offending field, in the same JSON envelope as
//! every other error, instead of axum's plain-text 4xx.

use axum::body::Bytes;
use axum::extract::path::ErrorKind as PathErrorKind;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::app_error::AppError;
use crate::error::field::FieldError;

/// Field reported when a problem is not tied to one key
pub const BODY_FIELD: &str = "body";

/// JSON request body / response payload
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(invalid(
                BODY_FIELD,
                "Expected a JSON body with Content-Type: application/json",
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(body_rejection)?;
        decode(&bytes).map(Json)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(rejection) => Err(path_rejection(rejection)),
        }
    }
}

/// Deserialize a JSON document, reporting the first bad field by its path
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);

    let value: T = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        if inner.is_syntax() || inner.is_eof() {
            return invalid(BODY_FIELD, "Malformed JSON body");
        }

        let message = strip_position(&inner.to_string());
        match missing_field(&message) {
            Some(name) if path == "." => invalid(name.clone(), format!("{name} is required")),
            Some(name) => invalid(format!("{path}.{name}"), format!("{name} is required")),
            None if path == "." => invalid(BODY_FIELD, message),
            None => invalid(path, message),
        }
    })?;

    deserializer
        .end()
        .map_err(|_| invalid(BODY_FIELD, "Malformed JSON body"))?;
    Ok(value)
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> AppError {
    AppError::validation("Validation failed").with_field_errors(vec![FieldError::new(field, message)])
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large("Request body is too large")
    } else {
        invalid(BODY_FIELD, "Request body could not be read")
    }
}

fn path_rejection(rejection: PathRejection) -> AppError {
    let PathRejection::FailedToDeserializePathParams(err) = rejection else {
        return AppError::internal("Path parameters unavailable").with_source(rejection);
    };

    match err.kind() {
        PathErrorKind::ParseErrorAtKey { key, value, .. } => {
            invalid(key.as_str(), format!("Invalid value `{value}`"))
        }
        PathErrorKind::ParseError { value, .. } | PathErrorKind::ParseErrorAtIndex { value, .. } => {
            invalid("id", format!("Invalid value `{value}`"))
        }
        PathErrorKind::DeserializeError { key, message, .. } => invalid(key.as_str(), message.as_str()),
        PathErrorKind::InvalidUtf8InPathParam { key } => invalid(key.as_str(), "Invalid UTF-8"),
        _ => invalid("path", err.body_text()),
    }
}

/// serde_json appends "at line L column C"; field errors don't need it
fn strip_position(message: &str) -> String {
    message
        .split(" at line ")
        .next()
        .unwrap_or(message)
        .to_string()
}

fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Draft {
        #[allow(dead_code)]
        name: String,
        #[allow(dead_code)]
        stock: u32,
        #[allow(dead_code)]
        dimensions: Option<Dimensions>,
    }

    #[derive(Debug, Deserialize)]
    struct Dimensions {
        #[allow(dead_code)]
        width: u32,
    }

    fn field_of(err: &AppError) -> &str {
        &err.field_errors()[0].field
    }

    #[test]
    fn test_bad_value_names_its_field() {
        let err = decode::<Draft>(r#"{"name":"Fogão","stock":"many"}"#.as_bytes()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(field_of(&err), "stock");
        assert!(!err.field_errors()[0].message.contains("line"));
    }

    #[test]
    fn test_nested_path_is_dotted() {
        let err =
            decode::<Draft>(br#"{"name":"a","stock":1,"dimensions":{"width":-3}}"#).unwrap_err();
        assert_eq!(field_of(&err), "dimensions.width");
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = decode::<Draft>(br#"{"name":"a"}"#).unwrap_err();
        assert_eq!(field_of(&err), "stock");
        assert_eq!(err.field_errors()[0].message, "stock is required");
    }

    #[test]
    fn test_syntax_errors_blame_the_body() {
        let bodies: [&[u8]; 3] = [b"{\"name\":", b"not json", b"{\"name\":\"a\",\"stock\":1} trailing"];
        for body in bodies {
            let err = decode::<Draft>(body).unwrap_err();
            assert_eq!(field_of(&err), BODY_FIELD);
            assert_eq!(err.field_errors()[0].message, "Malformed JSON body");
        }
    }

    #[test]
    fn test_valid_document_decodes() {
        assert!(decode::<Draft>(br#"{"name":"a","stock":2}"#).is_ok());
    }

    #[test]
    fn test_json_content_types() {
        let with = |value: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
            is_json_content_type(&headers)
        };
        assert!(with("application/json"));
        assert!(with("application/json; charset=utf-8"));
        assert!(with("application/problem+json"));
        assert!(!with("text/plain"));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }
}
