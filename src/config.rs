// =============================================================================
// Application Configuration — loaded once from the environment at startup
// =============================================================================
//
// `main` calls `dotenv::dotenv()` first, so a local `.env` file works the same
// as exported variables.  The API key is required; everything else has a
// default.  The resulting `AppConfig` is handed to the fetcher at construction
// and never re-read per request.
//
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;

pub const ENV_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
pub const ENV_BASE_URL: &str = "ALPHA_VANTAGE_BASE_URL";
pub const ENV_BIND_ADDR: &str = "INDICATOR_DASH_BIND_ADDR";
pub const ENV_TIMEOUT_SECS: &str = "INDICATOR_DASH_TIMEOUT_SECS";

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_base_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Clone)]
pub struct AppConfig {
    /// Secret sent as the `apikey` query parameter. Never logged.
    pub api_key: String,
    pub base_url: String,
    pub bind_addr: String,
    /// Upper bound on a single outbound API call.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("bind_addr", &self.bind_addr)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Build the config from process environment variables and validate it.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .with_context(|| format!("{ENV_API_KEY} is not set"))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url.trim().to_string();
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = addr.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
        }

        config.validate()?;
        info!(
            base_url = %config.base_url,
            bind_addr = %config.bind_addr,
            timeout_secs = config.request_timeout_secs,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("{ENV_API_KEY} must not be empty");
        }
        if self.base_url.is_empty() {
            bail!("{ENV_BASE_URL} must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("{ENV_TIMEOUT_SECS} must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Tests
// =============================================================================
