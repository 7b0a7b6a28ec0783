use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::HttpError;
use crate::transport::http_client::HttpTransport;
use crate::transport::request::ApiRequest;

#[derive(Debug, Serialize)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Seam for the token refresh call so the gateway can be exercised against
/// fake authenticators in tests.
#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchanges the long-lived refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, HttpError>;
}

/// Refreshes tokens against the real auth endpoint.
///
/// Talks to the transport directly, below the gateway pipeline, so a 401
/// from the refresh endpoint itself cannot recurse into another refresh.
pub struct AuthClient {
    transport: Arc<HttpTransport>,
    refresh_path: String,
}

impl AuthClient {
    pub fn new(transport: Arc<HttpTransport>, refresh_path: impl Into<String>) -> Self {
        Self {
            transport,
            refresh_path: refresh_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenRefresher for AuthClient {
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<String, HttpError> {
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: refresh_token.to_string(),
        })
        .map_err(|e| HttpError::Config(format!("failed to serialize refresh request: {e}")))?;

        let request = ApiRequest::new(Method::POST, &self.refresh_path).with_data(body);
        let (payload, _) = self
            .transport
            .execute(&request, None)
            .await
            .inspect_err(|e| warn!("token refresh call failed: {e}"))?;

        let response: RefreshResponse = serde_json::from_value(payload)
            .map_err(|_| HttpError::unauthorized("token refresh returned no access token"))?;

        debug!("token refresh succeeded");
        Ok(response.access_token)
    }
}
