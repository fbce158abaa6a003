use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod workflow;

pub fn router() -> Router<AppState> {
    handlers::analysis_routes()
}
