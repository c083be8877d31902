use crate::{config::ObjectStoreConfig, errors::MenuError, providers::object::ObjectStore};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

// --- Bucket API request structures ---

#[derive(Serialize)]
struct RemoveRequest {
    prefixes: Vec<String>,
}

// --- HTTP provider implementation ---

/// An object store client for bucket-style HTTP APIs.
///
/// Objects live under `{base_url}/object/{bucket}/{path}` and are publicly
/// readable under `{base_url}/object/public/{bucket}/{path}`. Writes carry
/// an optional bearer token.
#[derive(Clone, Debug)]
pub struct HttpObjectStore {
    client: ReqwestClient,
    base_url: String,
    bucket: String,
    api_key: Option<String>,
}

impl HttpObjectStore {
    /// Creates a new `HttpObjectStore` from its configuration.
    pub fn new(config: ObjectStoreConfig) -> Result<Self, MenuError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(MenuError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket,
            api_key: config.api_key,
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, MenuError> {
        let url = format!("{}/object/{}/{}", self.base_url, self.bucket, path);
        debug!(url = %url, size = bytes.len(), "--> Uploading asset");

        let response = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(MenuError::AssetRequest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MenuError::AssetApi { status, body });
        }

        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }

    async fn remove(&self, paths: &[String]) -> Result<(), MenuError> {
        if paths.is_empty() {
            return Ok(());
        }
        let url = format!("{}/object/{}", self.base_url, self.bucket);
        debug!(url = %url, count = paths.len(), "--> Removing assets");

        let request_body = RemoveRequest {
            prefixes: paths.to_vec(),
        };
        let response = self
            .authorized(self.client.delete(&url))
            .json(&request_body)
            .send()
            .await
            .map_err(MenuError::AssetRequest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MenuError::AssetApi { status, body });
        }

        Ok(())
    }
}
