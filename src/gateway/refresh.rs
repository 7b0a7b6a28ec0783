use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::HttpError;
use crate::notify::Notifier;
use crate::session::{SessionStore, TokenRefresher};
use crate::status;

/// Cloneable failure carried by the shared refresh future so every waiter
/// receives the same outcome.
#[derive(Debug, Clone)]
pub(crate) struct RefreshFailure {
    code: u16,
    message: String,
}

impl From<RefreshFailure> for HttpError {
    fn from(failure: RefreshFailure) -> Self {
        HttpError::Unauthorized {
            code: failure.code,
            message: failure.message,
        }
    }
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshFailure>>>;

/// Single-flight coordination of the token refresh call.
///
/// The first caller that observes an unauthorized response starts the
/// refresh; every concurrent caller subscribes to the same pending future
/// instead of issuing a second call. The in-flight slot is occupied only
/// while a refresh is running: the shared future clears it as its final
/// step, before any subscriber can observe the result, so the slot empties
/// exactly once per attempt no matter which caller drives the future (the
/// initiator may have been dropped mid-refresh).
pub(crate) struct RefreshCoordinator {
    in_flight: Arc<Mutex<Option<SharedRefresh>>>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) async fn refresh(
        &self,
        refresher: Arc<dyn TokenRefresher>,
        session: Arc<SessionStore>,
    ) -> Result<String, HttpError> {
        let future = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    debug!("refresh already in flight, subscribing to its result");
                    existing.clone()
                }
                None => {
                    let slot_handle = Arc::downgrade(&self.in_flight);
                    let future = async move {
                        let result = run_refresh(refresher, session).await;
                        if let Some(in_flight) = slot_handle.upgrade() {
                            *in_flight.lock().await = None;
                        }
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = Some(future.clone());
                    future
                }
            }
        };

        future.await.map_err(HttpError::from)
    }
}

async fn run_refresh(
    refresher: Arc<dyn TokenRefresher>,
    session: Arc<SessionStore>,
) -> Result<String, RefreshFailure> {
    let refresh_token = session.refresh_token().ok_or_else(|| RefreshFailure {
        code: status::UNAUTHORIZED,
        message: "no refresh token available".to_string(),
    })?;

    match refresher.refresh(&refresh_token).await {
        Ok(access_token) => {
            session.set_access_token(&access_token);
            Ok(access_token)
        }
        Err(e) => {
            warn!("token refresh failed: {e}");
            Err(RefreshFailure {
                code: status::UNAUTHORIZED,
                message: e.to_string(),
            })
        }
    }
}

/// Debounce for unauthorized side effects: within one window, at most one
/// error notification is shown and one logout is scheduled, no matter how
/// many requests fail. The logout itself runs after a short settle delay so
/// in-flight UI work can finish.
pub(crate) struct UnauthorizedGuard {
    shown: Arc<AtomicBool>,
    debounce: Duration,
    logout_delay: Duration,
}

impl UnauthorizedGuard {
    pub(crate) fn new(debounce: Duration, logout_delay: Duration) -> Self {
        Self {
            shown: Arc::new(AtomicBool::new(false)),
            debounce,
            logout_delay,
        }
    }

    pub(crate) fn trigger(
        &self,
        session: &Arc<SessionStore>,
        notifier: &Arc<dyn Notifier>,
        message: &str,
    ) {
        if self.shown.swap(true, Ordering::SeqCst) {
            debug!("unauthorized already handled within the debounce window");
            return;
        }

        notifier.show_error(message);

        let session = Arc::clone(session);
        let logout_delay = self.logout_delay;
        tokio::spawn(async move {
            sleep(logout_delay).await;
            session.clear();
        });

        let shown = Arc::clone(&self.shown);
        let debounce = self.debounce;
        tokio::spawn(async move {
            sleep(debounce).await;
            shown.store(false, Ordering::SeqCst);
        });
    }
}
