use axum::Json;
use axum::extract::{Path, Query, State};
use bson::Document;
use serde_json::Value;

use super::factory;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_all_users(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let params = factory::client_params(pairs);
    factory::get_all(&state.users, Document::new(), &params, &state.refine)
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    factory::get_one(&state.users, &id)
}
