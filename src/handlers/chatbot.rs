use axum::body::Bytes;
use axum::http::HeaderMap;
use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use crate::assistant;
use crate::error::{AppError, AppResult};
use crate::handlers::guard::{check_rate_limit, client_ip};
use crate::handlers::parse_json;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{ChatbotRequest, ChatbotResponse};
use crate::state::AppState;

pub async fn chatbot_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ChatbotResponse>> {
    REQUEST_TOTAL.inc();
    reply_to(&state, &headers, &body).map_err(AppError::for_chatbot)
}

fn reply_to(state: &AppState, headers: &HeaderMap, body: &[u8]) -> AppResult<Json<ChatbotResponse>> {
    check_rate_limit(
        state,
        "chatbot",
        &state.policies.chatbot,
        &client_ip(headers),
        "Rate limit exceeded. Please wait before sending another message.",
    )?;

    let start_time = Instant::now();

    let request: ChatbotRequest = parse_json(body)?;
    request
        .validate_with_history()
        .map_err(|errors| AppError::invalid("Invalid request payload.", &errors))?;

    let reply = assistant::reply(&request.message);
    debug!(topics = ?reply.matched_topics, "assistant replied");

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(ChatbotResponse { ok: true, reply }))
}
