use serde::{Deserialize, Serialize};

use crate::config::RefineConfig;
use crate::params::RawParams;

/// Requested page window. Values are not clamped: `page=0` yields a
/// negative skip and it is up to the store to reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Pagination { page, limit }
    }

    /// Read `page` and `limit`. Absent or non-integer values (including
    /// repeated keys) fall back to the configured defaults.
    pub fn from_params(params: &RawParams, config: &RefineConfig) -> Self {
        Pagination {
            page: parse_int(params, "page").unwrap_or(config.default_page),
            limit: parse_int(params, "limit").unwrap_or(config.default_page_size),
        }
    }

    /// `(page - 1) * limit`, saturating instead of overflowing.
    pub fn skip(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_int(params: &RawParams, key: &str) -> Option<i64> {
    params.get_str(key)?.trim().parse().ok()
}
