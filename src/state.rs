use crate::config::EndpointPolicies;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub policies: EndpointPolicies,
}
