//! Where the catalogue lives and which category to list.

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_CATEGORY: &str = "Dessert";

pub const BASE_URL_ENV: &str = "DESSERTS_API_BASE_URL";
pub const CATEGORY_ENV: &str = "DESSERTS_CATEGORY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("no tokio runtime is running: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

/// Endpoint configuration. Endpoint URLs are resolved once, up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    category: String,
    filter_url: Url,
    lookup_url: Url,
}

impl ApiConfig {
    /// Trailing slashes on `base_url` are ignored.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }
        let filter_url = base.join("filter.php").map_err(|e| invalid(e.to_string()))?;
        let lookup_url = base.join("lookup.php").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            base_url: base,
            category: DEFAULT_CATEGORY.to_string(),
            filter_url,
            lookup_url,
        })
    }

    /// Reads `DESSERTS_API_BASE_URL` and `DESSERTS_CATEGORY`, falling back to
    /// the public MealDB API and the `Dessert` category.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let config = Self::new(&base_url)?;
        Ok(match std::env::var(CATEGORY_ENV) {
            Ok(category) if !category.trim().is_empty() => config.with_category(category),
            _ => config,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn filter_url(&self) -> &Url {
        &self.filter_url
    }

    pub(crate) fn lookup_url(&self) -> &Url {
        &self.lookup_url
    }
}

/// The public MealDB API and the `Dessert` category.
impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid base URL")
    }
}
