//! HTTP endpoint handlers. Read-only; gameplay happens over the WebSocket.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_pool(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "earshot_backend", items = state.pool.len(), "HTTP pool served");
  Json(to_pool_out(&state.config.categories, &state.pool))
}
