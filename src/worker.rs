use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::{debug, info};
use crate::state::AppState;

// Background sweep - drops expired windows between requests
pub async fn sweep_worker(state: Arc<AppState>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    info!(?sweep_interval, "rate limit sweep worker started");

    loop {
        interval.tick().await;

        let removed = state.rate_limiter.sweep();
        if removed > 0 {
            debug!(removed, "sweep worker dropped expired windows");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointPolicies;
    use crate::rate_limit::tests::ManualClock;
    use crate::rate_limit::{RateLimitPolicy, RateLimiter};
    use crate::store::{MemoryStore, RateLimitStore};

    #[tokio::test(start_paused = true)]
    async fn worker_drops_closed_windows_on_each_tick() {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::at(0);
        let state = Arc::new(AppState {
            rate_limiter: RateLimiter::new(store.clone(), clock.clone()),
            policies: EndpointPolicies::default(),
        });

        let policy = RateLimitPolicy::new(1, 1_000);
        state.rate_limiter.check("contact:10.0.0.1", &policy).unwrap();
        state.rate_limiter.check("chatbot:10.0.0.2", &policy).unwrap();

        let worker = tokio::spawn(sweep_worker(state.clone(), Duration::from_secs(1)));

        // first tick fires at once, both windows are still open
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.len(), 2);

        clock.set(1_000);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.len(), 0);

        worker.abort();
    }
}
