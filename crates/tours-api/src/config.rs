use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use tours_query::{DEFAULT_PAGE_SIZE, RefineConfig};

pub const ADDR_VAR: &str = "TOURS_API_ADDR";
pub const ENV_VAR: &str = "TOURS_ENV";
pub const DATA_DIR_VAR: &str = "TOURS_DATA_DIR";
pub const PAGE_SIZE_VAR: &str = "TOURS_PAGE_SIZE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid TOURS_API_ADDR {value:?}: {source}")]
    Addr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error("invalid TOURS_ENV {0:?}, expected development or production")]
    Environment(String),
    #[error("invalid TOURS_PAGE_SIZE {0:?}, expected a positive integer")]
    PageSize(String),
}

/// Controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::Environment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub addr: SocketAddr,
    pub environment: Environment,
    /// Directory holding `tours.json`, `reviews.json` and `users.json`.
    pub data_dir: Option<PathBuf>,
    pub page_size: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            environment: Environment::default(),
            data_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = ApiConfig::default();

        if let Some(value) = get(ADDR_VAR) {
            config.addr = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::Addr { value, source })?;
        }
        if let Some(value) = get(ENV_VAR) {
            config.environment = value.parse()?;
        }
        if let Some(value) = get(DATA_DIR_VAR) {
            config.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(PAGE_SIZE_VAR) {
            config.page_size = match value.trim().parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::PageSize(value)),
            };
        }
        Ok(config)
    }

    pub fn refine_config(&self) -> RefineConfig {
        RefineConfig::default().with_page_size(self.page_size)
    }
}
