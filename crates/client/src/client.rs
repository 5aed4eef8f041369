//! Shared HTTP plumbing for every backend call.
//!
//! [`ApiClient`] owns the connection pool, base URL and bearer token.
//! It is cheap to clone; clones share the pool and the token, so a 401
//! seen through one clone logs all of them out.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::envelope;
use crate::error::ApiError;

/// Header carrying a per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the studio backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(http, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`]. The
    /// timeout in `config` is ignored; the given client's settings win.
    pub fn with_client(http: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(config.token)),
        }
    }

    /// Base URL including the `/api` prefix.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The bearer token currently in use, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replace the bearer token (e.g. after a fresh login).
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    /// `GET {base}{path}` and unwrap the envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.http.get(self.url(path))).await
    }

    /// `GET {base}{path}?{query}` and unwrap the envelope.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.http.get(self.url(path)).query(query)).await
    }

    /// `POST {base}{path}` with no body and unwrap the envelope.
    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.http.post(self.url(path))).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach auth and a request id, send, and decode the envelope.
    ///
    /// Any credential rejection (HTTP 401 or an auth envelope code)
    /// clears the stored token before the error is returned.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = request.header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.token.read().await.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        tracing::debug!(
            request_id = %request_id,
            url = %response.url(),
            status = response.status().as_u16(),
            "Backend responded",
        );

        let result = match Self::ensure_success(response).await {
            Ok(response) => {
                let body = response.bytes().await?;
                envelope::decode::<T>(&body).and_then(envelope::Envelope::into_result)
            }
            Err(e) => Err(e),
        };

        if let Err(ApiError::Unauthorized) = &result {
            tracing::warn!(request_id = %request_id, "Credentials rejected, clearing token");
            self.set_token(None).await;
        }
        result
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, [`ApiError::Unauthorized`] for a
    /// 401, or [`ApiError::Http`] with the status and body otherwise.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
