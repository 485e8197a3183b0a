use axum::{extract::State, response::IntoResponse};

use crate::AppState;

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics_handle.render()
}
