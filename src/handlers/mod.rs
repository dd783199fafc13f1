mod chatbot;
mod contact;
mod guard;
mod health;
mod metrics;

pub use chatbot::chatbot_handler;
pub use contact::contact_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;

use axum::{
    Router,
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/contact", post(contact_handler))
        .route("/api/chatbot", post(chatbot_handler))
        .with_state(state)
}

// Bodies are parsed by hand so the rate limit runs before any parsing
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|error| AppError::Validation {
        message: "Invalid request payload.".to_owned(),
        details: json!({ "body": [error.to_string()] }),
    })
}
