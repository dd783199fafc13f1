use prometheus::{Encoder, TextEncoder};

use crate::error::{AppError, AppResult};

pub async fn metrics_handler() -> AppResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|error| AppError::Internal(format!("failed to encode metrics: {error}")))?;
    String::from_utf8(buffer)
        .map_err(|error| AppError::Internal(format!("metrics are not utf-8: {error}")))
}
