// =============================================================================
// Application State — shared, immutable handles for the HTTP handlers
// =============================================================================
//
// Handlers hold an `Arc<AppState>`.  There is no mutable per-request state:
// every submission runs the pipeline from scratch against `source`.
// =============================================================================

use std::sync::Arc;

use crate::alpha_vantage::IndicatorSource;

pub struct AppState {
    /// Where indicator payloads come from (Alpha Vantage in production).
    pub source: Arc<dyn IndicatorSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn IndicatorSource>) -> Self {
        Self { source }
    }
}
