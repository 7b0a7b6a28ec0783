use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

use crate::constants::{
    DEFAULT_CACHE_EXPIRY_MS, DEFAULT_LOGOUT_DELAY_MS, DEFAULT_MAX_RETRIES, DEFAULT_REFRESH_PATH,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS, DEFAULT_UNAUTHORIZED_DEBOUNCE_MS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub rest_api: RestApiConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    /// Per-request transport timeout in milliseconds.
    pub timeout: u64,
    /// Send cookies along with every request (the `withCredentials` mode).
    pub with_credentials: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Default retry budget. Zero means no automatic retries; callers may
    /// raise it per request.
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    pub retry_delay: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Default TTL for opt-in GET response caching, in milliseconds.
    pub expiry: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Path of the token refresh endpoint, relative to the base URL.
    pub refresh_path: String,
    /// Window during which repeated unauthorized events collapse into one
    /// notification and one logout, in milliseconds.
    pub unauthorized_debounce: u64,
    /// Delay before logout is dispatched, in milliseconds.
    pub logout_delay: u64,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"rest_api\":{},\"retry\":{},\"cache\":{},\"auth\":{}}}",
            self.rest_api, self.retry, self.cache, self.auth
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{},\"with_credentials\":{}}}",
            self.base_url, self.timeout, self.with_credentials
        )
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"max_retries\":{},\"retry_delay\":{}}}",
            self.max_retries, self.retry_delay
        )
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"expiry\":{}}}", self.expiry)
    }
}

impl fmt::Display for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"refresh_path\":\"{}\",\"unauthorized_debounce\":{},\"logout_delay\":{}}}",
            self.refresh_path, self.unauthorized_debounce, self.logout_delay
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            rest_api: RestApiConfig {
                base_url: get_env_or_default(
                    "ADMIN_API_URL",
                    String::from("http://localhost:3000"),
                ),
                timeout: get_env_or_default("ADMIN_API_TIMEOUT", DEFAULT_REQUEST_TIMEOUT_MS),
                with_credentials: get_env_or_default("ADMIN_API_WITH_CREDENTIALS", false),
            },
            retry: RetryConfig {
                max_retries: get_env_or_default("ADMIN_API_MAX_RETRIES", DEFAULT_MAX_RETRIES),
                retry_delay: get_env_or_default("ADMIN_API_RETRY_DELAY", DEFAULT_RETRY_DELAY_MS),
            },
            cache: CacheConfig {
                expiry: get_env_or_default("ADMIN_API_CACHE_EXPIRY", DEFAULT_CACHE_EXPIRY_MS),
            },
            auth: AuthConfig {
                refresh_path: get_env_or_default(
                    "ADMIN_API_REFRESH_PATH",
                    String::from(DEFAULT_REFRESH_PATH),
                ),
                unauthorized_debounce: get_env_or_default(
                    "ADMIN_API_UNAUTHORIZED_DEBOUNCE",
                    DEFAULT_UNAUTHORIZED_DEBOUNCE_MS,
                ),
                logout_delay: get_env_or_default("ADMIN_API_LOGOUT_DELAY", DEFAULT_LOGOUT_DELAY_MS),
            },
        }
    }

    /// Config pointing at an explicit base URL, defaults everywhere else.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::new();
        config.rest_api.base_url = base_url.into();
        config
    }
}
