//! Read-only status endpoint served on the game port
//!
//! `GET /api/stats` asks the coordinator for a snapshot of player and world
//! counts and answers with it as JSON. Browsers on other origins may read it.

use crate::network::{request_stats, GatewayError, GatewayState};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

pub const STATS_PATH: &str = "/api/stats";

pub async fn stats_handler(
    State(gateway): State<GatewayState>,
) -> Result<impl IntoResponse, GatewayError> {
    let stats = request_stats(&gateway.server_tx).await?;
    Ok(([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(stats)))
}
