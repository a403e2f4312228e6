use std::path::{Path, PathBuf};

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document};
use serde_json::Value;
use tours_collection::MemoryCollection;

use crate::state::Collections;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Load `tours.json`, `reviews.json` and `users.json` from `dir`. A missing
/// file, or no directory at all, leaves that collection empty.
pub fn load(dir: Option<&Path>) -> Result<Collections, SeedError> {
    let mut collections = Collections::new();
    let Some(dir) = dir else {
        tracing::warn!("no data directory configured, serving empty collections");
        return Ok(collections);
    };
    load_into(&mut collections.tours, dir)?;
    load_into(&mut collections.reviews, dir)?;
    load_into(&mut collections.users, dir)?;
    Ok(collections)
}

fn load_into(collection: &mut MemoryCollection, dir: &Path) -> Result<(), SeedError> {
    let path = dir.join(format!("{}.json", collection.name()));
    if !path.exists() {
        tracing::warn!(path = %path.display(), "seed file missing");
        return Ok(());
    }
    let text = std::fs::read_to_string(&path).map_err(|source| SeedError::Io {
        path: path.clone(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| SeedError::Json {
        path: path.clone(),
        source,
    })?;
    let docs = parse_documents(value)
        .map_err(|e| SeedError::Invalid(format!("{}: {e}", path.display())))?;
    let inserted = collection.insert_many(docs);
    tracing::info!(collection = collection.name(), inserted, "loaded seed data");
    Ok(())
}

/// Convert a JSON array of objects into documents.
pub fn parse_documents(value: Value) -> Result<Vec<Document>, SeedError> {
    let Value::Array(items) = value else {
        return Err(SeedError::Invalid("expected a JSON array of documents".into()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match json_to_bson(item)? {
            Bson::Document(doc) => Ok(doc),
            _ => Err(SeedError::Invalid(format!("element {i} is not an object"))),
        })
        .collect()
}

/// JSON to BSON, understanding the `{"$oid": ...}` and `{"$date": ...}`
/// extended JSON wrappers.
pub fn json_to_bson(value: Value) -> Result<Bson, SeedError> {
    Ok(match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => match i32::try_from(i) {
                Ok(small) => Bson::Int32(small),
                Err(_) => Bson::Int64(i),
            },
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(
            items
                .into_iter()
                .map(json_to_bson)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            if map.len() == 1
                && let Some((key, inner)) = map.iter().next()
                && let Some(special) = extended(key, inner)
            {
                return special;
            }
            let mut doc = Document::new();
            for (key, value) in map {
                doc.insert(key, json_to_bson(value)?);
            }
            Bson::Document(doc)
        }
    })
}

fn extended(key: &str, value: &Value) -> Option<Result<Bson, SeedError>> {
    let invalid = |what: &str| SeedError::Invalid(format!("invalid {key} value: {what}"));
    match (key, value) {
        ("$oid", Value::String(hex)) => Some(
            ObjectId::parse_str(hex)
                .map(Bson::ObjectId)
                .map_err(|_| invalid(hex)),
        ),
        ("$date", Value::String(text)) => Some(
            DateTime::parse_rfc3339_str(text)
                .map(Bson::DateTime)
                .map_err(|_| invalid(text)),
        ),
        ("$date", Value::Number(n)) => Some(
            n.as_i64()
                .map(|millis| Bson::DateTime(DateTime::from_millis(millis)))
                .ok_or_else(|| invalid(&n.to_string())),
        ),
        _ => None,
    }
}
