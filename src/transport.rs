//! HTTP plumbing for the Redmine API.
//!
//! Low-level transport that handles authentication and raw requests.
//! Higher-level operations live on [`crate::Collection`] and the model
//! types; this layer only knows paths, query parameters, and status
//! codes.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::{RedmineError, Result};

const USER_AGENT: &str = concat!("redmine-api/", env!("CARGO_PKG_VERSION"));

/// Low-level HTTP transport.
///
/// Cheaply cloneable; clones reference the same underlying connection
/// pool. The API key is attached to every request, either as the
/// `X-Redmine-API-Key` header or as a `key=` query parameter depending
/// on what the server version supports.
#[derive(Clone)]
pub struct Transport {
    http: Client,
    base_url: Arc<Url>,
    api_key: Option<Arc<str>>,
    key_in_header: bool,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("key_in_header", &self.key_in_header)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Create a transport for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str, api_key: Option<&str>, key_in_header: bool) -> Result<Self> {
        // Ensure base URL ends with / so Url::join keeps the last segment
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(RedmineError::Transport)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: api_key.map(Arc::from),
            key_in_header,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn authenticate(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) if self.key_in_header => builder.header("X-Redmine-API-Key", key.as_ref()),
            Some(key) => builder.query(&[("key", key.as_ref())]),
            None => builder,
        }
    }

    /// GET a path and decode the response body as JSON.
    #[tracing::instrument(skip(self))]
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = self.base_url.join(path)?;
        let builder = self.authenticate(self.http.get(url));
        let response = builder.send().await.map_err(RedmineError::Transport)?;
        Self::decode_json(Self::check_response(response).await?).await
    }

    /// GET a path with query parameters and decode the body as JSON.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<serde_json::Value> {
        let url = self.base_url.join(path)?;
        let builder = self.authenticate(self.http.get(url)).query(query);
        let response = builder.send().await.map_err(RedmineError::Transport)?;
        Self::decode_json(Self::check_response(response).await?).await
    }

    /// PUT a JSON body to a path. Redmine update endpoints respond with
    /// no content on success, so nothing is decoded.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.base_url.join(path)?;
        let builder = self.authenticate(self.http.put(url)).json(body);
        let response = builder.send().await.map_err(RedmineError::Transport)?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// POST a JSON body to a path and decode the response.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let url = self.base_url.join(path)?;
        let builder = self.authenticate(self.http.post(url)).json(body);
        let response = builder.send().await.map_err(RedmineError::Transport)?;
        Self::decode_json(Self::check_response(response).await?).await
    }

    /// Decode a response body as JSON.
    ///
    /// Reads the body as text first so that a malformed body is a
    /// `Decode` error rather than a transport error.
    async fn decode_json(response: Response) -> Result<serde_json::Value> {
        let body = response.text().await.map_err(RedmineError::Transport)?;
        serde_json::from_str(&body).map_err(RedmineError::Decode)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RedmineError::Validation {
                errors: Self::extract_validation_errors(response).await,
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(RedmineError::Api {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Pull the `{"errors": [...]}` list out of a 422 response.
    async fn extract_validation_errors(response: Response) -> Vec<String> {
        let Ok(body) = response.text().await else {
            return Vec::new();
        };
        let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) else {
            return vec![body];
        };
        match json.get("errors").and_then(|e| e.as_array()) {
            Some(list) => list
                .iter()
                .map(|e| match e.as_str() {
                    Some(s) => s.to_string(),
                    None => e.to_string(),
                })
                .collect(),
            None => vec![json.to_string()],
        }
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}
