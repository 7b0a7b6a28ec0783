use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::constants::AUTHORIZATION_HEADER;
use crate::error::HttpError;
use crate::status;
use crate::transport::envelope::Envelope;
use crate::transport::request::ApiRequest;

/// Thin wrapper around one shared `reqwest::Client`.
///
/// Executes a single request descriptor into an unwrapped envelope payload.
/// Carries no retry, refresh or cache logic; that layering lives in the
/// gateway, which lets the refresh call reuse this transport without
/// recursing into the pipeline.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Arc<Self>, HttpError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.rest_api.timeout))
            .cookie_store(config.rest_api.with_credentials)
            .build()
            .map_err(|e| HttpError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Arc::new(Self {
            client,
            base_url: config.rest_api.base_url.clone(),
        }))
    }

    /// Sends one request and resolves it to `(payload, server message)`.
    ///
    /// Failures at any layer come back normalized: transport errors, non-2xx
    /// HTTP statuses and non-success envelope codes all map into
    /// [`HttpError`].
    #[instrument(skip(self, request, access_token), fields(method = %request.method, url = %request.url))]
    pub(crate) async fn execute(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<(Value, String), HttpError> {
        let url = format!("{}{}", self.base_url, request.url);
        debug!("dispatching {} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(params) = &request.params {
            builder = builder.query(&query_pairs(params));
        }
        if let Some(data) = &request.data {
            builder = builder.json(data);
        }
        if let Some(token) = access_token {
            builder = builder.header(AUTHORIZATION_HEADER, token);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            error!("request failed before a response arrived: {e}");
            HttpError::Transport(e)
        })?;

        Self::handle_response(response).await
    }

    async fn handle_response(response: Response) -> Result<(Value, String), HttpError> {
        let http_status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(HttpError::Transport)?;

        debug!("response status: {http_status}");

        if !http_status.is_success() {
            let message = envelope_message(&body_text)
                .unwrap_or_else(|| default_status_message(http_status));
            return Err(HttpError::from_code(http_status.as_u16(), message));
        }

        let envelope: Envelope = serde_json::from_str(&body_text).map_err(|e| {
            error!("undecodable response envelope: {e}");
            HttpError::Client {
                code: status::INTERNAL_SERVER_ERROR,
                message: format!("invalid response envelope: {e}"),
            }
        })?;

        envelope.into_result()
    }
}

/// Pulls the server-supplied message out of an error body, if there is one.
fn envelope_message(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    if envelope.message.is_empty() {
        None
    } else {
        Some(envelope.message)
    }
}

fn default_status_message(http_status: StatusCode) -> String {
    match http_status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("HTTP {}", http_status.as_u16()),
    }
}

/// Flattens a JSON object into query pairs. Scalar values serialize bare;
/// nested values fall back to their JSON text.
fn query_pairs(params: &Value) -> Vec<(String, String)> {
    match params {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect(),
        _ => Vec::new(),
    }
}
