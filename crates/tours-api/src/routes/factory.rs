use axum::Json;
use bson::Document;
use serde_json::{Value, json};
use tours_collection::MemoryCollection;
use tours_query::{QueryRefiner, Queryable, RawParams, RefineConfig};

use crate::error::AppError;
use crate::render::document_to_json;

/// Keys allowed to repeat in a query string (`?difficulty=easy&difficulty=medium`).
/// Any other repeated key keeps only its last value.
pub const REPEATABLE_KEYS: [&str; 6] = [
    "price",
    "duration",
    "ratingsQuantity",
    "ratingsAverage",
    "maxGroupSize",
    "difficulty",
];

/// Decoded query-string pairs to safe refiner input.
pub fn client_params(pairs: Vec<(String, String)>) -> RawParams {
    RawParams::from_pairs(pairs)
        .sanitized()
        .without_pollution(&REPEATABLE_KEYS)
}

/// Refined list of `collection`, restricted to `scope`.
pub fn get_all(
    collection: &MemoryCollection,
    scope: Document,
    params: &RawParams,
    config: &RefineConfig,
) -> Result<Json<Value>, AppError> {
    let cursor = collection.find().match_criteria(scope);
    let docs = QueryRefiner::with_config(cursor, params, config.clone())
        .refine()
        .into_query()
        .exec()?;

    let data: Vec<Value> = docs.iter().map(document_to_json).collect();
    Ok(Json(json!({
        "status": "success",
        "results": data.len(),
        "data": { "data": data },
    })))
}

pub fn get_one(collection: &MemoryCollection, id: &str) -> Result<Json<Value>, AppError> {
    let doc = collection.find_by_id(id)?.ok_or(AppError::NotFound)?;
    Ok(Json(json!({
        "status": "success",
        "data": { "data": document_to_json(&doc) },
    })))
}
