use crate::client::{CatalogSource, HttpCatalog, JsonFileCatalog};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// Default time a loaded catalog stays fresh
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Where the track catalog is read from
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogLocation {
    File(PathBuf),
    Url(String),
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogLocation,
    pub reference_chart_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Build the catalog source for the configured location
    pub fn catalog_source(&self) -> Box<dyn CatalogSource> {
        match &self.catalog {
            CatalogLocation::File(path) => Box::new(JsonFileCatalog::new(path.clone())),
            CatalogLocation::Url(url) => Box::new(HttpCatalog::new(url.clone())),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();

    let catalog = match (non_empty_var("CATALOG_PATH"), non_empty_var("CATALOG_URL")) {
        (Some(path), _) => CatalogLocation::File(PathBuf::from(path)),
        (None, Some(url)) => CatalogLocation::Url(url),
        (None, None) => bail!("Either CATALOG_PATH or CATALOG_URL must be set"),
    };

    let cache_ttl_secs = match non_empty_var("CATALOG_CACHE_TTL_SECS") {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("CATALOG_CACHE_TTL_SECS is not a number: {value}"))?,
        None => DEFAULT_CACHE_TTL_SECS,
    };

    Ok(Config {
        catalog,
        reference_chart_path: non_empty_var("REFERENCE_CHART_PATH").map(PathBuf::from),
        cache_ttl_secs,
    })
}
