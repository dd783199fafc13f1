mod assistant;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod state;
mod store;
mod worker;

use clap::Parser; // for cli
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, EndpointPolicies};
use crate::error::AppError;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;
use crate::worker::sweep_worker;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    // parse cli arguments
    let args = Args::parse();
    let policies = EndpointPolicies::from_args(&args)?;

    // creating shared state
    let state = Arc::new(AppState {
        rate_limiter: RateLimiter::in_memory().with_sweep_threshold(args.sweep_threshold),
        policies,
    });

    // spawn the background sweeper
    let worker_state = Arc::clone(&state);
    let sweep_interval = Duration::from_secs(args.sweep_interval.max(1));
    tokio::spawn(async move {
        sweep_worker(worker_state, sweep_interval).await;
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {addr}: {error}")))?;

    info!(%addr, "gateway listening");
    info!(
        max_requests = policies.contact.max_requests,
        window_ms = policies.contact.window_ms,
        "contact rate limit"
    );
    info!(
        max_requests = policies.chatbot.max_requests,
        window_ms = policies.chatbot.window_ms,
        "chatbot rate limit"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
