use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RefineConfig;
use crate::params::RawParams;

/// Field selection applied to every returned document.
///
/// With an empty `include` list every field is returned except `exclude`;
/// otherwise only `include` minus `exclude`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Projection {
    pub fn including<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection {
            include: fields.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection {
            include: Vec::new(),
            exclude: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `name,price,-_id`. A leading `-` marks an exclusion.
    pub fn parse(value: &str) -> Self {
        let mut projection = Projection::default();
        for token in value.split(',').map(str::trim) {
            match token.strip_prefix('-') {
                Some("") => {}
                Some(field) => projection.exclude.push(field.to_string()),
                None if token.is_empty() => {}
                None => projection.include.push(token.to_string()),
            }
        }
        projection
    }

    pub fn is_inclusive(&self) -> bool {
        !self.include.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Space separated store form, e.g. `name price -_id`.
impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self
            .include
            .iter()
            .cloned()
            .chain(self.exclude.iter().map(|field| format!("-{field}")))
            .collect();
        f.write_str(&tokens.join(" "))
    }
}

/// Projection requested by `fields`, or the default one hiding the
/// revision field. Never empty.
pub fn projection_spec(params: &RawParams, config: &RefineConfig) -> Projection {
    let requested = params
        .get("fields")
        .and_then(|v| v.joined())
        .map(|v| Projection::parse(&v))
        .unwrap_or_default();

    if requested.is_empty() {
        config.default_projection()
    } else {
        requested
    }
}
