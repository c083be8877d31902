//! # Configuration
//!
//! Environment-driven settings for the object store client. The relational
//! store takes its path directly at construction time, so the only ambient
//! configuration the core needs is where image assets live.

use crate::errors::MenuError;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

/// Connection settings for the HTTP object store.
#[derive(Debug, Deserialize, Clone)]
pub struct ObjectStoreConfig {
    /// Base URL of the object store API. Loaded from `OBJECT_STORE_URL`.
    pub base_url: String,
    /// The bucket that holds menu images. Loaded from `OBJECT_STORE_BUCKET`,
    /// defaulting to `menu-images`.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Optional bearer token. Loaded from `OBJECT_STORE_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_bucket() -> String {
    "menu-images".to_string()
}

impl ObjectStoreConfig {
    /// Loads the configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self, MenuError> {
        dotenv().ok();
        let base_url = env::var("OBJECT_STORE_URL")
            .map_err(|_| MenuError::MissingConfig("OBJECT_STORE_URL".to_string()))?;
        let bucket = env::var("OBJECT_STORE_BUCKET").unwrap_or_else(|_| default_bucket());
        let api_key = env::var("OBJECT_STORE_API_KEY").ok();

        Ok(Self {
            base_url,
            bucket,
            api_key,
        })
    }
}
