use axum::Json;
use axum::extract::{Path, Query, State};
use bson::{Document, doc};
use serde_json::Value;

use super::factory;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_all_reviews(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let params = factory::client_params(pairs);
    factory::get_all(&state.reviews, Document::new(), &params, &state.refine)
}

/// Reviews of one tour; a client `tour` filter cannot widen the scope.
pub async fn get_tour_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let params = factory::client_params(pairs);
    factory::get_all(&state.reviews, doc! { "tour": tour_id }, &params, &state.refine)
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    factory::get_one(&state.reviews, &id)
}
