use std::time::Duration;

use anyhow::Context as _;

/// Process-wide configuration, loaded once from the environment and held
/// behind an `Arc` for the life of the process.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub listen_addr: String,
    pub host_user: String,
    pub upstream_base: String,
    pub upstream_timeout: Duration,
    pub max_advertisement_bytes: usize,
    pub request_body_limit: usize,
}

impl AdapterConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = env_or_default("REDIRECT_LISTEN_ADDR", "0.0.0.0:8080");

        let host_user = std::env::var("REDIRECT_HOST_USER")
            .with_context(|| "REDIRECT_HOST_USER environment variable must be set".to_string())?;

        let upstream_base = env_or_default("REDIRECT_UPSTREAM_BASE", "https://github.com");

        let upstream_timeout_ms: u64 = env_or_default("REDIRECT_UPSTREAM_TIMEOUT_MS", "10000")
            .parse()
            .context("REDIRECT_UPSTREAM_TIMEOUT_MS must be an integer")?;

        let max_advertisement_bytes: usize =
            env_or_default("REDIRECT_MAX_ADVERTISEMENT_BYTES", "1048576")
                .parse()
                .context("REDIRECT_MAX_ADVERTISEMENT_BYTES must be an integer")?;

        let request_body_limit: usize = env_or_default("REDIRECT_REQUEST_BODY_LIMIT", "1048576")
            .parse()
            .context("REDIRECT_REQUEST_BODY_LIMIT must be an integer")?;

        Ok(Self {
            listen_addr,
            host_user,
            upstream_base,
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            max_advertisement_bytes,
            request_body_limit,
        })
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) => v,
        Err(_) => {
            tracing::info!(key, default, "environment variable unset, using default");
            default.to_string()
        }
    }
}
