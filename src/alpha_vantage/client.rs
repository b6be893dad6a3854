// =============================================================================
// Alpha Vantage REST Client — single GET per indicator request
// =============================================================================
//
// SECURITY: The API key travels as the `apikey` query parameter, so request
// URLs are never logged.  Every call is bounded by the configured timeout;
// there is no retry.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};

use super::{classify, FetchError, IndicatorResponse, IndicatorSource};
use crate::config::AppConfig;
use crate::types::IndicatorRequest;

/// Alpha Vantage `query` endpoint client.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client from validated startup configuration.
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        Self::with_timeout(
            config.api_key.clone(),
            config.base_url.clone(),
            config.request_timeout(),
        )
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into();

        debug!(base_url = %base_url, ?timeout, "AlphaVantageClient initialised");

        Ok(Self {
            api_key: api_key.into(),
            base_url,
            client,
        })
    }

    /// Query parameters for `req`, including the secret key.
    fn query_params<'a>(&'a self, req: &'a IndicatorRequest) -> [(&'static str, &'a str); 5] {
        [
            ("function", req.function.as_str()),
            ("symbol", req.symbol.as_str()),
            ("interval", req.interval.as_str()),
            ("series_type", req.series_type.as_str()),
            ("apikey", self.api_key.as_str()),
        ]
    }

    // -------------------------------------------------------------------------
    // Indicator fetch
    // -------------------------------------------------------------------------

    /// GET `<base_url>?function=..&symbol=..&interval=..&series_type=..&apikey=..`
    #[instrument(
        skip(self, req),
        name = "alpha_vantage::fetch_indicator",
        fields(symbol = %req.symbol, function = %req.function)
    )]
    pub async fn fetch_indicator(
        &self,
        req: &IndicatorRequest,
    ) -> Result<IndicatorResponse, FetchError> {
        info!("requesting indicator data");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(req))
            .send()
            .await
            .map_err(|e| {
                // `without_url` keeps the apikey out of the logged message.
                let e = e.without_url();
                error!(error = %e, "indicator request failed");
                FetchError::Http(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            error!(%status, "indicator request returned non-success status");
            return Err(FetchError::Http(format!("status {status}")));
        }

        let body: serde_json::Value = resp.json().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "failed to decode indicator response");
            FetchError::UnexpectedFormat(format!("body is not valid JSON: {e}"))
        })?;

        let data_key = req.function.descriptor().data_key();
        match classify(body, &data_key) {
            Ok(resp) => {
                info!("data retrieval successful");
                Ok(resp)
            }
            Err(e) => {
                error!(error = %e, "indicator response rejected");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl IndicatorSource for AlphaVantageClient {
    async fn fetch(&self, req: &IndicatorRequest) -> Result<IndicatorResponse, FetchError> {
        self.fetch_indicator(req).await
    }
}

// =============================================================================
// Tests
// =============================================================================
