use axum::Json;
use axum::extract::{Path, Query, State};
use bson::Document;
use serde_json::Value;

use super::factory;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_all_tours(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let params = factory::client_params(pairs);
    factory::get_all(&state.tours, Document::new(), &params, &state.refine)
}

/// The five best rated tours, cheapest first on ties. Overrides any
/// `limit`, `sort` or `fields` the client sent.
pub async fn top_five_cheap(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let params = factory::client_params(pairs)
        .with("limit", "5")
        .with("sort", "-ratingsAverage,price")
        .with("fields", "name,price,ratingsAverage,summary,difficulty");
    factory::get_all(&state.tours, Document::new(), &params, &state.refine)
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    factory::get_one(&state.tours, &id)
}
