use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

/// Access/refresh token pair held by the session.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Process-wide credential store read by every outgoing request.
///
/// Mutated only by login (`set_tokens`), logout (`clear`) and a successful
/// refresh (`set_access_token`, which retains the refresh token). Guarded by
/// an `RwLock` so concurrent requests can read tokens without blocking each
/// other.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: RwLock<Option<SessionTokens>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<SessionTokens>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<SessionTokens>> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a fresh token pair after login.
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        *self.write() = Some(SessionTokens {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        });
        debug!("session tokens stored");
    }

    /// Replaces the access token after a successful refresh. The refresh
    /// token stays as it was. No-op when logged out.
    pub fn set_access_token(&self, access_token: impl Into<String>) {
        if let Some(tokens) = self.write().as_mut() {
            tokens.access_token = access_token.into();
            debug!("access token refreshed");
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().as_ref().map(|t| t.refresh_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Drops the stored credentials; the logout side of the session contract.
    pub fn clear(&self) {
        *self.write() = None;
        debug!("session cleared");
    }
}
