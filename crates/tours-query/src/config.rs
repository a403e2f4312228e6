use serde::{Deserialize, Serialize};

use crate::projection::Projection;
use crate::sort::Sort;

/// Page used when the request has no valid `page`.
pub const DEFAULT_PAGE: i64 = 1;
/// Page size used when the request has no valid `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Field the default ordering sorts on, newest first.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";
/// Internal revision field hidden by the default projection.
pub const REVISION_FIELD: &str = "__v";

/// Fallbacks the refiner applies when a request leaves a stage unspecified.
/// One per collection; override with the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineConfig {
    pub default_sort: Vec<Sort>,
    pub default_page: i64,
    pub default_page_size: i64,
    pub revision_field: String,
}

impl Default for RefineConfig {
    fn default() -> Self {
        RefineConfig {
            default_sort: vec![Sort::desc(DEFAULT_SORT_FIELD)],
            default_page: DEFAULT_PAGE,
            default_page_size: DEFAULT_PAGE_SIZE,
            revision_field: REVISION_FIELD.to_string(),
        }
    }
}

impl RefineConfig {
    pub fn with_default_sort(mut self, sort: Vec<Sort>) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    pub fn with_revision_field(mut self, field: impl Into<String>) -> Self {
        self.revision_field = field.into();
        self
    }

    pub fn default_projection(&self) -> Projection {
        Projection::excluding([self.revision_field.clone()])
    }
}
