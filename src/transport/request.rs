use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

/// Everything a call site can say about one outbound request.
///
/// Created per call, immutable once handed to the gateway. Behavior flags
/// default to "show errors, don't show success, don't cache".
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL.
    pub url: String,
    /// Query parameters as a JSON object.
    pub params: Option<Value>,
    /// JSON body payload.
    pub data: Option<Value>,
    /// Per-request header overrides.
    pub headers: Vec<(String, String)>,
    pub show_success_message: bool,
    pub show_error_message: bool,
    pub use_cache: bool,
    pub cache_key: Option<String>,
    pub cache_expiry: Option<Duration>,
    /// Retry budget override; the gateway default applies when unset.
    pub max_retries: Option<u32>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: None,
            data: None,
            headers: Vec::new(),
            show_success_message: false,
            show_error_message: true,
            use_cache: false,
            cache_key: None,
            cache_expiry: None,
            max_retries: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_success_message(mut self) -> Self {
        self.show_success_message = true;
        self
    }

    /// Suppresses the generic error notification for this request.
    pub fn silent(mut self) -> Self {
        self.show_error_message = false;
        self
    }

    pub fn cached(mut self) -> Self {
        self.use_cache = true;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn with_cache_expiry(mut self, expiry: Duration) -> Self {
        self.cache_expiry = Some(expiry);
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Cache key: the explicit override, else the canonical
    /// `METHOD|url|params|body` join.
    pub(crate) fn cache_lookup_key(&self) -> String {
        if let Some(key) = &self.cache_key {
            return key.clone();
        }
        format!(
            "{}|{}|{}|{}",
            self.method,
            self.url,
            serialize_or_empty(self.params.as_ref()),
            serialize_or_empty(self.data.as_ref()),
        )
    }

    /// POST/PUT calls that supply query parameters but no body mean the
    /// params *were* the body; normalize before dispatch.
    pub(crate) fn promote_params_to_body(&mut self) {
        if (self.method == Method::POST || self.method == Method::PUT)
            && self.params.is_some()
            && self.data.is_none()
        {
            self.data = self.params.take();
        }
    }
}

fn serialize_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "{}".to_string(),
    }
}
