// =============================================================================
// HTTP Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /        empty indicator form (initial values)
//   POST /        run the pipeline; chart page on success, form + message
//                 on failure
//   GET  /health  liveness probe
//
// Every failure is converted to a page here; none escape the handler.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::pages;
use crate::app_state::AppState;
use crate::form::FormValues;
use crate::pipeline::{self, PipelineError};

// =============================================================================
// Router construction
// =============================================================================

/// Build the router with request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Indicator form
// =============================================================================

async fn index() -> Html<String> {
    Html(pages::index_page(&FormValues::default(), None, None))
}

async fn submit(
    State(state): State<Arc<AppState>>,
    Form(raw): Form<HashMap<String, String>>,
) -> Response {
    match pipeline::run(state.source.as_ref(), &raw).await {
        Ok(view) => {
            info!(title = %view.title, "chart rendered");
            Html(pages::chart_page(&view)).into_response()
        }
        Err(err) => error_page(&raw, &err),
    }
}

/// Re-render the form with the submitted values and a user-facing message.
fn error_page(raw: &HashMap<String, String>, err: &PipelineError) -> Response {
    let values = FormValues::from_raw(raw);
    let (status, field_errors) = match err {
        PipelineError::Validation(errors) => (StatusCode::OK, Some(errors)),
        PipelineError::Fetch(_) => (StatusCode::BAD_GATEWAY, None),
        PipelineError::Transform(_) | PipelineError::NoData => (StatusCode::OK, None),
        PipelineError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };
    let html = pages::index_page(&values, field_errors, Some(err.user_message()));
    (status, Html(html)).into_response()
}

// =============================================================================
// Tests
// =============================================================================
