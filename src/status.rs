//! Numeric status codes shared by the HTTP layer and the response envelope.
//!
//! The server mirrors HTTP status semantics inside the envelope `code` field,
//! so the same constants classify both transport-level and envelope-level
//! outcomes.

pub const SUCCESS: u16 = 200;
pub const UNAUTHORIZED: u16 = 401;
pub const REQUEST_TIMEOUT: u16 = 408;
pub const INTERNAL_SERVER_ERROR: u16 = 500;
pub const BAD_GATEWAY: u16 = 502;
pub const SERVICE_UNAVAILABLE: u16 = 503;
pub const GATEWAY_TIMEOUT: u16 = 504;

/// Transient outcomes eligible for the bounded retry loop.
pub fn is_retryable(code: u16) -> bool {
    matches!(
        code,
        REQUEST_TIMEOUT
            | INTERNAL_SERVER_ERROR
            | BAD_GATEWAY
            | SERVICE_UNAVAILABLE
            | GATEWAY_TIMEOUT
    )
}

/// True for any 2xx envelope code.
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}
