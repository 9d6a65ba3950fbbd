//! HTTP client for a running catalog server.
//!
//! Used by the CLI's `--remote` mode. Configuration comes from [`Config`]:
//! `PHYSCAT_URL` for the base url and `PHYSCAT_API_KEY` for operator routes.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::*;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: API key required or invalid")]
    Unauthorized,

    #[error("Rate limited, try again later")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl CatalogClient {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.server_url.clone(), config.api_key.clone())
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
            StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(ClientError::RateLimited),
            _ => Err(ClientError::Server(format!("{}: {}", status, body))),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::POST, path).send().await?;
        self.handle_response(response).await
    }

    // ============================================================
    // Resources
    // ============================================================

    /// The resource with `id`, or `None` when the server has no such resource.
    pub async fn get_resource(&self, id: Uuid) -> Result<Option<ResourceNode>, ClientError> {
        match self.get(&format!("/resources/{}", id), &[]).await {
            Ok(resource) => Ok(Some(resource)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn browse(&self, search: Option<&str>) -> Result<BrowseView, ClientError> {
        let query: Vec<(&str, String)> = search
            .map(|term| vec![("search", term.to_string())])
            .unwrap_or_default();
        self.get("/browse", &query).await
    }

    // ============================================================
    // Seeds
    // ============================================================

    pub async fn seed_runs(&self) -> Result<Vec<SeedRun>, ClientError> {
        self.get("/seeds", &[]).await
    }

    pub async fn seed_all(&self) -> Result<Vec<SeedReport>, ClientError> {
        self.post("/admin/seed").await
    }

    pub async fn reseed(&self, source: &str) -> Result<SeedReport, ClientError> {
        self.post(&format!("/admin/seed/{}", urlencoding::encode(source)))
            .await
    }

    pub async fn reset(&self) -> Result<Vec<SeedReport>, ClientError> {
        self.post("/admin/reset").await
    }
}
