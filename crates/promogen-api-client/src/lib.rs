//! HTTP client for the promogen generation API.
//!
//! Provides a minimal client with optional `X-API-Key` auth, generic GET/POST
//! helpers, domain methods for the upload/generate/status/assets contracts, and the
//! [`GenerationBackend`] trait the job controller is written against.

pub mod api;
pub mod backend;
pub mod error;

use promogen_core::ClientConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use backend::GenerationBackend;
pub use error::ApiError;
pub use reqwest::StatusCode;

/// Path prefix of every endpoint.
pub const API_PREFIX: &str = "/api";

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    None,
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// HTTP client for the generation API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: &str, auth: Auth, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let auth = match &config.api_key {
            Some(key) => Auth::XApiKey(key.clone()),
            None => Auth::None,
        };
        Self::new(&config.api_url, auth, config.http_timeout())
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => request,
            Auth::XApiKey(key) => request.header("X-API-Key", key.as_str()),
        }
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.get(self.build_url(path)));
        Self::read_json(request.send().await?).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        Self::read_json(request.send().await?).await
    }

    /// POST JSON body and return the raw response text of a successful call.
    pub async fn post_json_text<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, ApiError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_body(status, &text));
        }
        Ok(text)
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).multipart(form));
        Self::read_json(request.send().await?).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = %status, "API request failed");
            return Err(ApiError::from_body(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// Re-export domain types for convenience.
pub use promogen_core::models::{
    AltTextResponse, AssetResult, ContrastCheckResponse, GenerateAck, GenerationRequest,
    HealthResponse, JobStatusResponse, UploadResponse,
};
