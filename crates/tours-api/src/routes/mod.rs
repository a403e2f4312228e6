mod factory;
mod reviews;
mod tours;
mod users;

use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

pub use factory::{REPEATABLE_KEYS, client_params};

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/tours", get(tours::get_all_tours))
        .route("/api/v1/tours/top-5-cheap", get(tours::top_five_cheap))
        .route("/api/v1/tours/{id}", get(tours::get_tour))
        .route("/api/v1/tours/{id}/reviews", get(reviews::get_tour_reviews))
        .route("/api/v1/reviews", get(reviews::get_all_reviews))
        .route("/api/v1/reviews/{id}", get(reviews::get_review))
        .route("/api/v1/users", get(users::get_all_users))
        .route("/api/v1/users/{id}", get(users::get_user))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.to_string())
}
