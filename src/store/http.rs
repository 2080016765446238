//! HTTP record store for the hosted profiles backend.
//!
//! Speaks the backend's PostgREST-style JSON API: rows live under
//! `{base_url}/rest/v1/{table}`, filters go in the query string
//! (`id=eq.<key>`), and writes ask for the persisted row back with
//! `Prefer: return=representation`. Authentication is the service key,
//! sent both as `apikey` and as a bearer token.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::models::{ProfilePatch, UserProfile};
use crate::store::{InsertError, RecordStore, StoreError};

#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub base_url: String,

    pub api_key: String,

    pub table: String,

    pub timeout_seconds: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            table: "profiles".to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Error payload the backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
}

pub struct HttpRecordStore {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl HttpRecordStore {
    pub fn new(config: &HttpStoreConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid store base URL: {}", config.base_url))?;
        let endpoint = base
            .join(&format!("rest/v1/{}", config.table))
            .context("Failed to build table endpoint")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("profilectl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Reads the error body of a failed response into a `StoreError::Api`.
    async fn api_error(response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|e| match (e.code, e.message) {
                (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
                (None, Some(msg)) => Some(msg),
                _ => None,
            })
            .unwrap_or(body);

        warn!("Store API error: {} - {}", status, message);
        StoreError::Api { status, message }
    }

    /// Decodes a representation response; the backend always wraps rows in an
    /// array, even for single-row writes.
    async fn decode_rows(response: Response) -> Result<Vec<UserProfile>, StoreError> {
        response
            .json::<Vec<UserProfile>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        debug!("GET profile {}", id);

        let filter = format!("eq.{id}");
        let response = self
            .authed(self.client.get(self.endpoint.clone()))
            .query(&[("select", "*"), ("id", filter.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut rows = Self::decode_rows(response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn insert(&self, profile: &UserProfile) -> Result<UserProfile, InsertError> {
        debug!("INSERT profile {}", profile.id);

        let response = self
            .authed(self.client.post(self.endpoint.clone()))
            .header("Prefer", "return=representation")
            .json(profile)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if response.status() == StatusCode::CONFLICT {
            // Duplicate key on the id column: another caller won the race.
            let body = response.text().await.unwrap_or_default();
            debug!("Insert conflict for {}: {}", profile.id, body);
            return Err(InsertError::UniqueViolation(profile.id.clone()));
        }

        if !response.status().is_success() {
            return Err(Self::api_error(response).await.into());
        }

        let mut rows = Self::decode_rows(response).await?;
        if rows.is_empty() {
            return Err(
                StoreError::Decode("insert returned no representation".to_string()).into(),
            );
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<Option<UserProfile>, StoreError> {
        debug!("PATCH profile {}", id);

        let filter = format!("eq.{id}");
        let response = self
            .authed(self.client.patch(self.endpoint.clone()))
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let mut rows = Self::decode_rows(response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}
