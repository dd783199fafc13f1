use axum::Json;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use thiserror::Error;
use validator::ValidationErrors;

use crate::rate_limit::RateLimitError;

const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation. `details` maps field names to messages.
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: u64,
        remaining: u32,
        reset_at_ms: i64,
    },

    #[error("internal error: {0}")]
    Internal(String),

    /// Chatbot failure, answered in the chatbot's `{ ok, error }` shape.
    #[error("chatbot error: {0}")]
    ChatbotUnavailable(String),
}

impl AppError {
    /// Field errors as `{ field: [message, ...] }`. Falls back to the
    /// validator code when a rule has no message.
    pub fn invalid(message: &str, errors: &ValidationErrors) -> Self {
        let details: Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|error| {
                        let text = error.message.as_ref().unwrap_or(&error.code);
                        Value::String(text.to_string())
                    })
                    .collect();
                (field.to_string(), Value::Array(messages))
            })
            .collect();

        Self::Validation {
            message: message.to_owned(),
            details: Value::Object(details),
        }
    }

    pub fn for_chatbot(self) -> Self {
        match self {
            Self::Internal(message) => Self::ChatbotUnavailable(message),
            other => other,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::invalid("Validation failed", &errors)
    }
}

impl From<RateLimitError> for AppError {
    fn from(value: RateLimitError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message, "details": details })),
            )
                .into_response(),
            AppError::RateLimited {
                message,
                retry_after_secs,
                remaining,
                reset_at_ms,
            } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": message, "retryAfter": retry_after_secs })),
                )
                    .into_response();
                let headers = response.headers_mut();
                headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
                headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
                headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_at_ms));
                response
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "An error occurred while processing your request." })),
                )
                    .into_response()
            }
            AppError::ChatbotUnavailable(message) => {
                tracing::error!(error = %message, "chatbot request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false, "error": "Unable to process your message right now." })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn validation_errors_become_field_details() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            ValidationError::new("email").with_message("must be a valid email address".into()),
        );
        errors.add("interest", ValidationError::new("interest"));

        let AppError::Validation { message, details } = AppError::from(errors) else {
            panic!("expected a validation error");
        };

        assert_eq!(message, "Validation failed");
        assert_eq!(
            details,
            json!({
                "email": ["must be a valid email address"],
                "interest": ["interest"]
            })
        );
    }

    #[test]
    fn only_internal_errors_switch_to_the_chatbot_body() {
        assert!(matches!(
            AppError::Internal("boom".to_owned()).for_chatbot(),
            AppError::ChatbotUnavailable(_)
        ));
        assert!(matches!(
            AppError::from(ValidationErrors::new()).for_chatbot(),
            AppError::Validation { .. }
        ));
    }
}
