//! HTTP list endpoints for tours, reviews and users, refined from the
//! request's query string.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod seed;
pub mod state;

use axum::Router;
use axum::middleware;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(middleware::map_response_with_state(
            state.environment,
            error::expose_details,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
