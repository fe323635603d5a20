mod dto;
pub mod handlers;
pub mod model;
pub mod nutrition;
mod repo;
mod repo_types;
pub mod scaling;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
