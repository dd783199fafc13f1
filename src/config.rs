use clap::Parser;

use crate::rate_limit::{RateLimitError, RateLimitPolicy};

// Chatbot default when no override is given: 20 messages per minute
const CHATBOT_MAX_REQUESTS: u32 = 20;
const CHATBOT_WINDOW_MS: u64 = 60_000;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "optiveon-gateway")]
#[command(about = "Rate-limited contact and chatbot endpoints for the Optiveon site")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Default max requests per window
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 5)]
    pub rate_limit_max: u32,

    // Default window in milliseconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_MS", default_value_t = 60_000)]
    pub rate_limit_window_ms: u64,

    // Contact form overrides (fall back to the default policy)
    #[arg(long)]
    pub contact_max: Option<u32>,

    #[arg(long)]
    pub contact_window_ms: Option<u64>,

    // Chatbot overrides (fall back to 20 per minute)
    #[arg(long)]
    pub chatbot_max: Option<u32>,

    #[arg(long)]
    pub chatbot_window_ms: Option<u64>,

    // Tracked identifiers before a request triggers a sweep
    #[arg(long, default_value_t = crate::rate_limit::DEFAULT_SWEEP_THRESHOLD)]
    pub sweep_threshold: usize,

    // Background sweep interval in seconds
    #[arg(long, default_value_t = 60)]
    pub sweep_interval: u64,
}

/// Per-endpoint policies, validated once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPolicies {
    pub contact: RateLimitPolicy,
    pub chatbot: RateLimitPolicy,
}

impl EndpointPolicies {
    pub fn from_args(args: &Args) -> Result<Self, RateLimitError> {
        let policies = Self {
            contact: RateLimitPolicy::new(
                args.contact_max.unwrap_or(args.rate_limit_max),
                args.contact_window_ms.unwrap_or(args.rate_limit_window_ms),
            ),
            chatbot: RateLimitPolicy::new(
                args.chatbot_max.unwrap_or(CHATBOT_MAX_REQUESTS),
                args.chatbot_window_ms.unwrap_or(CHATBOT_WINDOW_MS),
            ),
        };
        policies.contact.validate()?;
        policies.chatbot.validate()?;
        Ok(policies)
    }
}

impl Default for EndpointPolicies {
    fn default() -> Self {
        Self {
            contact: RateLimitPolicy::new(5, 60_000),
            chatbot: RateLimitPolicy::new(CHATBOT_MAX_REQUESTS, CHATBOT_WINDOW_MS),
        }
    }
}
