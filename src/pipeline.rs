// =============================================================================
// Request Pipeline — validate → fetch → transform → render
// =============================================================================
//
// One call per form submission.  Each stage short-circuits to a
// `PipelineError` carrying the stage it failed in and a user-facing message.
// Nothing is retained between calls.
// =============================================================================

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::alpha_vantage::{FetchError, IndicatorSource};
use crate::chart::{self, RenderError};
use crate::form::{self, FormErrors};
use crate::series::{self, TransformError};
use crate::types::IndicatorRequest;

pub const MSG_FETCH_FAILED: &str = "Failed to fetch data. Please try again.";
pub const MSG_NO_DATA: &str = "No data available for the given parameters.";
pub const MSG_RENDER_FAILED: &str = "Failed to render chart. Please try again.";
pub const MSG_INVALID_FORM: &str = "Please correct the errors below.";

/// Where in the request lifecycle a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Transforming,
    Rendering,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validating => write!(f, "Validating"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Transforming => write!(f, "Transforming"),
            Self::Rendering => write!(f, "Rendering"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] FormErrors),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Transform succeeded but produced zero rows.
    #[error("indicator series is empty")]
    NoData,

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation(_) => Stage::Validating,
            Self::Fetch(_) => Stage::Fetching,
            Self::Transform(_) | Self::NoData => Stage::Transforming,
            Self::Render(_) => Stage::Rendering,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => MSG_INVALID_FORM,
            Self::Fetch(_) => MSG_FETCH_FAILED,
            Self::Transform(_) | Self::NoData => MSG_NO_DATA,
            Self::Render(_) => MSG_RENDER_FAILED,
        }
    }
}

/// Successful outcome: the chart plus the request it was drawn for.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub request: IndicatorRequest,
    pub title: String,
    /// Base64 PNG for a `data:image/png;base64,` URI.
    pub chart_base64: String,
}

/// Run every stage for one raw form submission.
#[instrument(skip_all, name = "pipeline::run")]
pub async fn run(
    source: &dyn IndicatorSource,
    raw: &HashMap<String, String>,
) -> Result<ChartView, PipelineError> {
    let result = run_stages(source, raw).await;
    if let Err(e) = &result {
        warn!(stage = %e.stage(), error = %e, "request failed");
    }
    result
}

async fn run_stages(
    source: &dyn IndicatorSource,
    raw: &HashMap<String, String>,
) -> Result<ChartView, PipelineError> {
    let request = form::validate(raw)?;
    let descriptor = request.function.descriptor();
    info!(
        symbol = %request.symbol,
        function = %request.function,
        interval = %request.interval,
        series_type = %request.series_type,
        "form validated"
    );

    let response = source.fetch(&request).await?;

    let series = series::transform(&response, descriptor)?;
    if series.is_empty() {
        return Err(PipelineError::NoData);
    }

    let image = chart::render(&series, &request.symbol, descriptor)?;

    Ok(ChartView {
        title: descriptor.chart_title(&request.symbol),
        chart_base64: image.to_base64(),
        request,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::alpha_vantage::{classify, IndicatorResponse};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Source that answers every fetch with a fixed body.
    pub(crate) struct StubSource(pub Value);

    #[async_trait]
    impl IndicatorSource for StubSource {
        async fn fetch(&self, req: &IndicatorRequest) -> Result<IndicatorResponse, FetchError> {
            classify(self.0.clone(), &req.function.descriptor().data_key())
        }
    }

    pub(crate) fn two_row_body() -> Value {
        json!({
            "Meta Data": { "1: Symbol": "IBM" },
            "Technical Analysis: HT_PHASOR": {
                "2023-01-02": { "InPhase": "1.5", "Quadrature": "-0.5" },
                "2023-01-01": { "InPhase": "1.0", "Quadrature": "0.2" }
            }
        })
    }

    pub(crate) fn ibm_form() -> HashMap<String, String> {
        [
            ("symbol", "IBM"),
            ("function", "HT_PHASOR"),
            ("interval", "weekly"),
            ("series_type", "close"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[tokio::test]
    async fn happy_path_produces_chart() {
        let view = run(&StubSource(two_row_body()), &ibm_form()).await.unwrap();
        assert_eq!(view.title, "HT_PHASOR for IBM");
        assert!(!view.chart_base64.is_empty());
        assert_eq!(view.request.symbol, "IBM");
    }

    #[tokio::test]
    async fn invalid_form_stops_before_fetch() {
        let mut raw = ibm_form();
        raw.insert("symbol".into(), "WAYTOOLONGSYMBOL".into());
        let err = run(&StubSource(two_row_body()), &raw).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Validating);
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn api_error_maps_to_fetch_stage() {
        let body = json!({ "Error Message": "Invalid API call." });
        let err = run(&StubSource(body), &ibm_form()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Fetching);
        assert_eq!(err.user_message(), MSG_FETCH_FAILED);
    }

    #[tokio::test]
    async fn empty_block_is_no_data() {
        let body = json!({ "Technical Analysis: HT_PHASOR": {} });
        let err = run(&StubSource(body), &ibm_form()).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoData));
        assert_eq!(err.user_message(), MSG_NO_DATA);
    }

    #[tokio::test]
    async fn non_numeric_cell_is_transform_failure() {
        let body = json!({
            "Technical Analysis: HT_PHASOR": {
                "2023-01-01": { "InPhase": "abc", "Quadrature": "0.2" }
            }
        });
        let err = run(&StubSource(body), &ibm_form()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Transforming);
        assert!(matches!(err, PipelineError::Transform(_)));
    }

    #[tokio::test]
    async fn missing_column_is_render_failure() {
        let body = json!({
            "Technical Analysis: HT_PHASOR": {
                "2023-01-01": { "InPhase": "1.0" }
            }
        });
        let err = run(&StubSource(body), &ibm_form()).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Rendering);
        assert_eq!(err.user_message(), MSG_RENDER_FAILED);
    }
}
