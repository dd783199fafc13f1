use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, extract::State};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use validator::Validate;
use crate::error::AppResult;
use crate::handlers::guard::{check_rate_limit, client_ip};
use crate::handlers::parse_json;
use crate::metrics::{REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::{ContactRequest, ContactResponse};
use crate::state::AppState;

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ContactResponse>)> {
    REQUEST_TOTAL.inc();
    let ip = client_ip(&headers);

    check_rate_limit(
        &state,
        "contact",
        &state.policies.contact,
        &ip,
        "Too many requests. Please try again later.",
    )?;

    let start_time = Instant::now();

    let request: ContactRequest = parse_json(&body)?;
    request.validate()?;

    // Persistence and notification live outside this service
    info!(
        interest = %request.interest,
        has_company = request.company.is_some(),
        %ip,
        "contact submission accepted"
    );

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: "Thank you for your message! We'll get back to you shortly.".to_owned(),
        }),
    ))
}
