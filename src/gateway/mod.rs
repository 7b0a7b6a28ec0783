//! The single choke point for outbound API calls.
//!
//! Every request runs an ordered pipeline: cache check, dispatch over the
//! shared transport, single-flight token refresh on unauthorized, bounded
//! retry on transient failures. A cache hit short-circuits everything after
//! it; unauthorized outcomes take the refresh detour without consuming
//! retry budget.

mod refresh;
mod retry;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::HttpError;
use crate::notify::{LogNotifier, Notifier};
use crate::session::{AuthClient, SessionStore, TokenRefresher};
use crate::transport::cache::ResponseCache;
use crate::transport::http_client::HttpTransport;
use crate::transport::request::ApiRequest;

use refresh::{RefreshCoordinator, UnauthorizedGuard};

pub struct HttpGateway {
    transport: Arc<HttpTransport>,
    session: Arc<SessionStore>,
    cache: ResponseCache,
    notifier: Arc<dyn Notifier>,
    refresher: Arc<dyn TokenRefresher>,
    refresh: RefreshCoordinator,
    unauthorized: UnauthorizedGuard,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpGateway {
    /// Builds the gateway from configuration. One instance owns all the
    /// cross-cutting state (cache, refresh coordination, debounce); construct
    /// it once at startup and share it.
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self, HttpError> {
        let transport = HttpTransport::new(config)?;
        let refresher: Arc<dyn TokenRefresher> = Arc::new(AuthClient::new(
            Arc::clone(&transport),
            &config.auth.refresh_path,
        ));

        Ok(Self {
            transport,
            session,
            cache: ResponseCache::new(Duration::from_millis(config.cache.expiry)),
            notifier: Arc::new(LogNotifier),
            refresher,
            refresh: RefreshCoordinator::new(),
            unauthorized: UnauthorizedGuard::new(
                Duration::from_millis(config.auth.unauthorized_debounce),
                Duration::from_millis(config.auth.logout_delay),
            ),
            max_retries: config.retry.max_retries,
            retry_delay: Duration::from_millis(config.retry.retry_delay),
        })
    }

    /// Swaps in the UI-messaging collaborator.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Swaps in the token refresh collaborator.
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = refresher;
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, HttpError> {
        request.method = Method::GET;
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, HttpError> {
        request.method = Method::POST;
        self.send(request).await
    }

    pub async fn put<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, HttpError> {
        request.method = Method::PUT;
        self.send(request).await
    }

    pub async fn del<T: DeserializeOwned>(&self, mut request: ApiRequest) -> Result<T, HttpError> {
        request.method = Method::DELETE;
        self.send(request).await
    }

    /// Dispatch with the method already set on the descriptor.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, HttpError> {
        self.send(request).await
    }

    /// Evicts one cache entry, or all of them when no key is given.
    pub fn clear_cache(&self, key: Option<&str>) {
        self.cache.clear(key);
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, HttpError> {
        let payload = self.dispatch(request).await?;
        serde_json::from_value(payload)
            .map_err(|e| HttpError::Config(format!("failed to decode response payload: {e}")))
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn dispatch(&self, mut request: ApiRequest) -> Result<Value, HttpError> {
        // Stage 1: cache check. A hit resolves here; no network, no retry,
        // no refresh.
        let cache_key = if request.use_cache && request.method == Method::GET {
            let key = request.cache_lookup_key();
            if let Some(hit) = self.cache.get(&key) {
                return Ok(hit);
            }
            Some(key)
        } else {
            None
        };

        request.promote_params_to_body();

        // Stages 2 and 3: dispatch with the auth detour inside each attempt,
        // transient retry around the whole cycle. The budget is shared
        // across the refresh detour.
        let budget = request.max_retries.unwrap_or(self.max_retries);
        let mut attempt = 0u32;
        let outcome = loop {
            match self.attempt(&request).await {
                Ok(success) => break Ok(success),
                Err(err) if attempt < budget && retry::should_retry(&err) => {
                    attempt += 1;
                    warn!(
                        "attempt {attempt} of {} failed ({err}); retrying in {:?}",
                        budget + 1,
                        self.retry_delay
                    );
                    sleep(self.retry_delay).await;
                }
                Err(err) => break Err(err),
            }
        };

        match outcome {
            Ok((data, message)) => {
                if request.show_success_message && !message.is_empty() {
                    self.notifier.show_success(&message);
                }
                if let Some(key) = cache_key {
                    self.cache
                        .store(key, data.clone(), request.cache_expiry);
                }
                Ok(data)
            }
            Err(err) => {
                // Unauthorized has its own debounced path and never reaches
                // the generic toast.
                if request.show_error_message && !err.is_unauthorized() {
                    self.notifier.show_error(&err.to_string());
                }
                Err(err)
            }
        }
    }

    /// One full dispatch+auth cycle: send with the current token, and on an
    /// unauthorized outcome run the single-flight refresh and reissue once.
    async fn attempt(&self, request: &ApiRequest) -> Result<(Value, String), HttpError> {
        let access_token = self.session.access_token();
        match self.transport.execute(request, access_token.as_deref()).await {
            Err(err) if err.is_unauthorized() => self.refresh_and_reissue(request).await,
            other => other,
        }
    }

    async fn refresh_and_reissue(&self, request: &ApiRequest) -> Result<(Value, String), HttpError> {
        debug!("unauthorized response, entering token refresh");
        let refreshed = self
            .refresh
            .refresh(Arc::clone(&self.refresher), Arc::clone(&self.session))
            .await;

        match refreshed {
            Ok(access_token) => {
                match self.transport.execute(request, Some(&access_token)).await {
                    // Still unauthorized with a fresh token: unrecoverable.
                    Err(err) if err.is_unauthorized() => {
                        self.unauthorized
                            .trigger(&self.session, &self.notifier, &err.to_string());
                        Err(err)
                    }
                    other => other,
                }
            }
            Err(err) => {
                self.unauthorized
                    .trigger(&self.session, &self.notifier, &err.to_string());
                Err(err)
            }
        }
    }
}
