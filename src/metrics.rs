use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("optiveon_requests_total", "Total number of requests").unwrap();
    pub static ref RATE_LIMIT_ALLOWED: CounterVec = register_counter_vec!(
        "optiveon_rate_limit_allowed_total",
        "Requests admitted by the rate limiter",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_DENIED: CounterVec = register_counter_vec!(
        "optiveon_rate_limit_denied_total",
        "Requests rejected by the rate limiter",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_SWEPT: Counter = register_counter!(
        "optiveon_rate_limit_swept_total",
        "Expired rate limit entries removed by sweeps"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge = register_gauge!(
        "optiveon_rate_limit_entries",
        "Identifiers currently tracked by the rate limiter"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "optiveon_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
}
