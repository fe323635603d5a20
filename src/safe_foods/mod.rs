mod dto;
pub mod handlers;
pub mod lifecycle;
pub mod model;
mod repo;
pub mod timeline;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
