use bson::{Document, doc};
use serde::{Deserialize, Serialize};

use crate::projection::Projection;
use crate::sort::Sort;

/// A lazily built query over a document collection.
///
/// Every method consumes the handle and returns the derived one, so earlier
/// states can be kept around by cloning before a stage is applied.
pub trait Queryable: Sized {
    /// Add equality / range criteria to the existing ones.
    fn match_criteria(self, criteria: Document) -> Self;
    /// Replace the ordering.
    fn order_by(self, sort: Vec<Sort>) -> Self;
    /// Replace the field selection.
    fn project(self, projection: Projection) -> Self;
    fn skip(self, n: i64) -> Self;
    fn limit(self, n: i64) -> Self;
}

/// Plain description of a query, detached from any store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinedQuery {
    pub filter: Document,
    #[serde(default)]
    pub sort: Vec<Sort>,
    pub projection: Option<Projection>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl RefinedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a fixed scope, e.g. the reviews of one tour.
    pub fn scoped(criteria: Document) -> Self {
        RefinedQuery {
            filter: criteria,
            ..Self::default()
        }
    }
}

impl Queryable for RefinedQuery {
    fn match_criteria(mut self, criteria: Document) -> Self {
        self.filter = merge_criteria(self.filter, criteria);
        self
    }

    fn order_by(mut self, sort: Vec<Sort>) -> Self {
        self.sort = sort;
        self
    }

    fn project(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    fn skip(mut self, n: i64) -> Self {
        self.skip = Some(n);
        self
    }

    fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Combine two filters so that both must hold.
///
/// - either side empty → the other
/// - no key with differing values → one merged document
/// - otherwise → `{ "$and": [existing, criteria] }`, so a client filter can
///   never overwrite a scope criterion
pub fn merge_criteria(existing: Document, criteria: Document) -> Document {
    if existing.is_empty() {
        return criteria;
    }
    if criteria.is_empty() {
        return existing;
    }

    let conflict = criteria
        .iter()
        .any(|(key, value)| existing.get(key).is_some_and(|prev| prev != value));
    if conflict {
        return doc! { "$and": [existing, criteria] };
    }

    let mut merged = existing;
    for (key, value) in criteria {
        merged.insert(key, value);
    }
    merged
}
