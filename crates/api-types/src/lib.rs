//! Shared request/response types used by API-facing crates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

/// A single rejected form field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of a 422 response: every field failure for the submission at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

/// One page of a listing.
///
/// `page` is 1-based. A request past the last page yields an empty `items`
/// with `total` and `page_count` still reflecting the full result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_ok_payload() {
        let response = HealthCheckResponse::ok();
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn error_response_round_trip_json() {
        let response = ErrorResponse {
            code: "not_found".to_string(),
            message: "resource missing".to_string(),
        };

        let json = serde_json::to_string(&response).expect("serialize error response");
        let decoded: ErrorResponse =
            serde_json::from_str(&json).expect("deserialize error response");

        assert_eq!(decoded, response);
    }

    #[test]
    fn validation_errors_serialize_per_field() {
        let body = ValidationErrorResponse {
            errors: vec![
                FieldError::new("drone_license", "license must be 8 characters"),
                FieldError::new("skill_rating", "rating must be in [1, 100]"),
            ],
        };

        let json = serde_json::to_string(&body).expect("serialize validation errors");

        assert!(json.contains("drone_license"));
        assert!(json.contains("skill_rating"));
    }

    #[test]
    fn empty_page_keeps_totals() {
        let page: Page<String> = Page {
            items: vec![],
            page: 9,
            page_size: 5,
            page_count: 2,
            total: 7,
        };

        let json = serde_json::to_string(&page).expect("serialize page");
        let decoded: Page<String> = serde_json::from_str(&json).expect("deserialize page");

        assert_eq!(decoded, page);
    }
}
