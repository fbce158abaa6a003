use axum::{extract::State, Json};
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub success: bool,
    pub status: &'static str,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    /// Whole seconds since the process started serving.
    pub uptime: u64,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let now = OffsetDateTime::now_utc();
    Json(Health {
        success: true,
        status: "ok",
        timestamp: (now.unix_timestamp_nanos() / 1_000_000) as i64,
        uptime: state.started_at.elapsed().as_secs(),
    })
}
