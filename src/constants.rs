pub(crate) const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
pub(crate) const DEFAULT_LOGOUT_DELAY_MS: u64 = 500;
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 0;
pub(crate) const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub(crate) const DEFAULT_UNAUTHORIZED_DEBOUNCE_MS: u64 = 3_000;
pub(crate) const DEFAULT_CACHE_EXPIRY_MS: u64 = 60_000;

pub(crate) const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";
pub(crate) const AUTHORIZATION_HEADER: &str = "Authorization";
