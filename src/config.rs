//! Process configuration
//!
//! Resolved once at start-up from the environment and passed explicitly into
//! the storage, loader and search constructors.

use crate::client::Auth;
use crate::error::{EtlError, Result};
use std::num::NonZeroUsize;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_SEARCH_FIELD: &str = "source_description";
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Connection and naming settings for the backing document store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub apikey: Option<String>,
    pub database: String,
    pub collection: String,
    pub search_field: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 9200,
            username: Some("root".to_string()),
            password: Some("example".to_string()),
            apikey: None,
            database: "startup".to_string(),
            collection: "investment".to_string(),
            search_field: DEFAULT_SEARCH_FIELD.to_string(),
        }
    }
}

impl StoreConfig {
    /// Base URL of the store, e.g. `http://localhost:9200/`
    pub fn url(&self) -> std::result::Result<Url, url::ParseError> {
        Url::parse(&format!("{}://{}:{}/", self.scheme, self.host, self.port))
    }

    /// Fully qualified collection name inside the store, `<database>.<collection>`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection).to_lowercase()
    }

    /// Name of the text index on the search field
    pub fn index_name(&self) -> String {
        format!("{}_text", self.search_field)
    }

    pub fn auth(&self) -> Auth {
        match (&self.apikey, &self.username, &self.password) {
            (Some(apikey), _, _) => Auth::Apikey(apikey.clone()),
            (None, Some(username), Some(password)) => {
                Auth::Basic(username.clone(), password.clone())
            }
            _ => Auth::None,
        }
    }
}

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub store: StoreConfig,
    pub chunk_size: NonZeroUsize,
    pub search_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            chunk_size: NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl Config {
    /// Resolve configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults. An empty `STORE_USERNAME` disables
    /// basic authentication.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();
        let text = |key: &str, default: String| lookup(key).unwrap_or(default);
        let optional = |key: &str, default: Option<String>| match lookup(key) {
            Some(value) if value.is_empty() => None,
            Some(value) => Some(value),
            None => default,
        };

        let store = StoreConfig {
            scheme: text("STORE_SCHEME", defaults.scheme),
            host: text("STORE_HOST", defaults.host),
            port: parse(&lookup, "STORE_PORT", defaults.port)?,
            username: optional("STORE_USERNAME", defaults.username),
            password: optional("STORE_PASSWORD", defaults.password),
            apikey: optional("STORE_APIKEY", defaults.apikey),
            database: text("STORE_DATABASE", defaults.database),
            collection: text("STORE_COLLECTION", defaults.collection),
            search_field: text("ETL_SEARCH_FIELD", defaults.search_field),
        };

        let chunk_size: usize = parse(&lookup, "ETL_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?;
        let chunk_size = NonZeroUsize::new(chunk_size)
            .ok_or_else(|| EtlError::Config("ETL_CHUNK_SIZE must be greater than zero".into()))?;

        Ok(Self {
            store,
            chunk_size,
            search_limit: parse(&lookup, "SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT)?,
        })
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| EtlError::Config(format!("{key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}
