use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RefineConfig;
use crate::params::RawParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse one store-style token: `price` ascending, `-price` descending.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.strip_prefix('-') {
            Some("") => None,
            Some(field) => Some(Sort::desc(field)),
            None if token.is_empty() => None,
            None => Some(Sort::asc(token)),
        }
    }
}

/// Formats back to the token it was parsed from.
impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}", self.field),
            SortDirection::Desc => write!(f, "-{}", self.field),
        }
    }
}

/// Parse a comma separated sort list such as `price,-ratingsAverage`.
/// Empty tokens are skipped.
pub fn parse_sort(value: &str) -> Vec<Sort> {
    value.split(',').filter_map(Sort::parse).collect()
}

/// Space separated form, e.g. `price -ratingsAverage`.
pub fn sort_string(sorts: &[Sort]) -> String {
    sorts
        .iter()
        .map(Sort::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordering requested by `sort`, or the configured default when the key is
/// absent or lists no usable field.
pub fn sort_spec(params: &RawParams, config: &RefineConfig) -> Vec<Sort> {
    let requested = params
        .get("sort")
        .and_then(|v| v.joined())
        .map(|v| parse_sort(&v))
        .unwrap_or_default();

    if requested.is_empty() {
        config.default_sort.clone()
    } else {
        requested
    }
}
