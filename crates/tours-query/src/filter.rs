use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::operator::Comparison;
use crate::params::{ParamValue, RawParams};

/// Keys consumed by the refiner itself; never part of a filter.
pub const RESERVED_KEYS: [&str; 4] = ["sort", "limit", "page", "fields"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Equality and range criteria derived from the non-reserved parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(Document);

impl FilterSpec {
    /// Copy every non-reserved top-level parameter into a filter document.
    ///
    /// Keys that are exactly `gt`, `gte`, `lt` or `lte` are rewritten to the
    /// store's operator token wherever they appear in the tree; every other
    /// key and all values pass through untouched. Values stay strings: any
    /// casting to the field's type happens in the store.
    pub fn from_params(params: &RawParams) -> Self {
        let mut doc = Document::new();
        for (key, value) in params.iter() {
            if is_reserved(key) {
                continue;
            }
            doc.insert(rewrite_key(key), to_bson(value));
        }
        FilterSpec(doc)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn rewrite_key(key: &str) -> String {
    match Comparison::from_key(key) {
        Some(op) => op.token().to_string(),
        None => key.to_string(),
    }
}

fn to_bson(value: &ParamValue) -> Bson {
    match value {
        ParamValue::Str(s) => Bson::String(s.clone()),
        ParamValue::List(items) => Bson::Array(items.iter().cloned().map(Bson::String).collect()),
        ParamValue::Map(entries) => {
            let mut doc = Document::new();
            for (key, value) in entries {
                doc.insert(rewrite_key(key), to_bson(value));
            }
            Bson::Document(doc)
        }
    }
}
