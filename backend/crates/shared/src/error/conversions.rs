//! Error conversions - From implementations for common error types
//!
//! Provides automatic conversion from common error types to [`AppError`]
//! and the JSON error envelope written for HTTP responses.

use super::app_error::AppError;
use super::kind::ErrorKind;

// ============================================================================
// Standard library conversions
// ============================================================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => ErrorKind::Forbidden,
            _ => ErrorKind::Internal,
        };
        AppError::new(kind, "I/O operation failed").with_source(err)
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(err: std::num::ParseIntError) -> Self {
        AppError::validation("Invalid integer format").with_source(err)
    }
}

// ============================================================================
// serde_json conversions
// ============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            AppError::validation(format!("JSON parse error: {}", err)).with_source(err)
        } else {
            AppError::internal("JSON serialization error").with_source(err)
        }
    }
}

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found").with_source(err),
            sqlx::Error::Database(db_err) => {
                // PostgreSQL specific error codes
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let app_err = match db_err.code().as_deref() {
                    // Class 23: integrity constraint violation
                    Some("23505") => AppError::conflict("Duplicate key value"),
                    Some("23503") => AppError::conflict("Referenced record does not exist"),
                    Some("23502") => AppError::validation("Required field is null"),
                    Some("23514") => AppError::validation("Check constraint violation"),
                    Some("22P02") | Some("22003") => AppError::validation("Malformed value"),
                    _ => AppError::internal("Database error"),
                };
                app_err.with_source(err)
            }
            _ => AppError::internal("Database error").with_source(err),
        }
    }
}

// ============================================================================
// Response envelope
// ============================================================================

impl AppError {
    /// `{ success: false, message, code, errors?, error? }` 形式の応答本文
    ///
    /// `error` は `expose` が真で、原因エラーがある場合にのみ含まれます。
    pub fn to_envelope(&self, expose: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "success": false,
            "message": self.message(),
            "code": self.kind().code(),
        });

        if !self.field_errors().is_empty() {
            body["errors"] = serde_json::to_value(self.field_errors())
                .unwrap_or(serde_json::Value::Null);
        }

        if expose {
            if let Some(detail) = self.detail() {
                body["error"] = serde_json::Value::String(detail);
            }
        }

        body
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = self.to_envelope(super::exposure::expose_details());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::field::FieldError;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert_eq!(app_err.kind(), ErrorKind::NotFound);

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let app_err: AppError = io_err.into();
        assert_eq!(app_err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_err: Result<i32, _> = "abc".parse();
        let app_err: AppError = parse_err.unwrap_err().into();
        assert_eq!(app_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = json_err.into();
        assert_eq!(app_err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_envelope_carries_field_errors() {
        let err = AppError::validation("Validation failed")
            .with_field_errors(vec![FieldError::new("price", "Price is required")]);
        let body = err.to_envelope(false);

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["code"], "VALIDATION");
        assert_eq!(body["errors"][0]["field"], "price");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_envelope_hides_detail_unless_exposed() {
        let io_err = std::io::Error::other("connection reset");
        let err = AppError::internal("Failed to create product").with_source(io_err);

        let hidden = err.to_envelope(false);
        assert!(hidden.get("error").is_none());
        assert!(hidden.get("errors").is_none());

        let shown = err.to_envelope(true);
        assert_eq!(shown["error"], "connection reset");
        assert_eq!(shown["message"], "Failed to create product");
    }
}
