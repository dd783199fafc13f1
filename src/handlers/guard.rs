use axum::http::HeaderMap;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::metrics::{RATE_LIMIT_ALLOWED, RATE_LIMIT_DENIED, RATE_LIMIT_ENTRIES};
use crate::rate_limit::{RateLimitDecision, RateLimitPolicy};
use crate::state::AppState;

// Client address from proxy headers, "unknown" when neither is usable
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    forwarded_for
        .or_else(real_ip)
        .unwrap_or("unknown")
        .to_owned()
}

/// Counts the request against `"<endpoint>:<client-ip>"` and turns a denial
/// into a 429.
pub fn check_rate_limit(
    state: &AppState,
    endpoint: &str,
    policy: &RateLimitPolicy,
    ip: &str,
    denied_message: &str,
) -> AppResult<RateLimitDecision> {
    let identifier = format!("{endpoint}:{ip}");

    let decision = state.rate_limiter.check(&identifier, policy)?;
    RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);

    if decision.allowed {
        RATE_LIMIT_ALLOWED.with_label_values(&[endpoint]).inc();
        return Ok(decision);
    }

    RATE_LIMIT_DENIED.with_label_values(&[endpoint]).inc();
    let retry_after_secs = decision.retry_after_secs(state.rate_limiter.now_ms());
    info!(endpoint, ip, retry_after_secs, "rate limit exceeded");

    Err(AppError::RateLimited {
        message: denied_message.to_owned(),
        retry_after_secs,
        remaining: decision.remaining,
        reset_at_ms: decision.reset_at_ms,
    })
}
