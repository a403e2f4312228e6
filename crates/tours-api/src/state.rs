use std::sync::Arc;

use bson::doc;
use tours_collection::{CollectionConfig, MemoryCollection};
use tours_query::RefineConfig;

use crate::config::{ApiConfig, Environment};

/// The three collections the API serves, before they are shared.
#[derive(Debug)]
pub struct Collections {
    pub tours: MemoryCollection,
    pub reviews: MemoryCollection,
    pub users: MemoryCollection,
}

impl Collections {
    pub fn new() -> Self {
        Collections {
            tours: MemoryCollection::new(CollectionConfig::new("tours")),
            reviews: MemoryCollection::new(CollectionConfig::new("reviews")),
            users: MemoryCollection::new(
                CollectionConfig::new("users")
                    .with_hidden_fields(["password", "active"])
                    .with_scope(doc! { "active": { "$ne": false } }),
            ),
        }
    }
}

impl Default for Collections {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub tours: Arc<MemoryCollection>,
    pub reviews: Arc<MemoryCollection>,
    pub users: Arc<MemoryCollection>,
    pub refine: RefineConfig,
    pub environment: Environment,
}

impl AppState {
    pub fn new(collections: Collections, config: &ApiConfig) -> Self {
        AppState {
            tours: Arc::new(collections.tours),
            reviews: Arc::new(collections.reviews),
            users: Arc::new(collections.users),
            refine: config.refine_config(),
            environment: config.environment,
        }
    }
}
