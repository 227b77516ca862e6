//! Success response envelope
//!
//! `{ success: true, message?, data?, pagination? }`. Error envelopes are
//! produced by [`crate::error::app_error::AppError`].

use serde::{Deserialize, Serialize};

use crate::pagination::PageMeta;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: PageMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success with only a message and no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRequest;

    #[test]
    fn test_ok_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_paginated_with_message() {
        let meta = PageMeta::new(3, PageRequest::new(None, None, 10));
        let resp = ApiResponse::paginated(vec!["a"], meta).with_message("ok");
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["message"], "ok");
        assert_eq!(json["pagination"]["total"], 3);
    }

    #[test]
    fn test_message_only() {
        let json = serde_json::to_value(ApiResponse::message("Deleted")).unwrap();
        assert_eq!(json["message"], "Deleted");
        assert!(json.get("data").is_none());
    }
}
