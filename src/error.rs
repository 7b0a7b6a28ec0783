use std::fmt;
use std::fmt::{Display, Formatter};

use crate::status;

/// Normalized error for every failure mode of the gateway.
///
/// Transport failures, non-2xx HTTP statuses and non-success envelope codes
/// all collapse into this one shape so callers see a numeric code and a
/// message regardless of which layer failed.
#[derive(Debug)]
pub enum HttpError {
    /// The request could not be constructed or the response could not be
    /// decoded into the expected shape.
    Config(String),
    /// No response was received from the server.
    Transport(reqwest::Error),
    /// The server rejected the credentials; eligible for token refresh.
    Unauthorized { code: u16, message: String },
    /// Non-success code in the retry-eligible set (timeouts, 5xx family).
    Server { code: u16, message: String },
    /// Non-success code outside the retry-eligible set (validation,
    /// not-found and friends).
    Client { code: u16, message: String },
}

impl HttpError {
    /// Numeric code carried by the normalized error.
    ///
    /// Transport errors map onto the status the server would have answered
    /// with (timeout, unavailable) so the retry predicate can treat them
    /// uniformly.
    pub fn code(&self) -> u16 {
        match self {
            HttpError::Config(_) => status::INTERNAL_SERVER_ERROR,
            HttpError::Transport(e) => {
                if e.is_timeout() {
                    status::REQUEST_TIMEOUT
                } else if e.is_connect() {
                    status::SERVICE_UNAVAILABLE
                } else {
                    status::INTERNAL_SERVER_ERROR
                }
            }
            HttpError::Unauthorized { code, .. }
            | HttpError::Server { code, .. }
            | HttpError::Client { code, .. } => *code,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, HttpError::Unauthorized { .. })
    }

    /// Classifies a non-success code into the taxonomy.
    pub(crate) fn from_code(code: u16, message: String) -> Self {
        if code == status::UNAUTHORIZED {
            HttpError::Unauthorized { code, message }
        } else if status::is_retryable(code) {
            HttpError::Server { code, message }
        } else {
            HttpError::Client { code, message }
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        HttpError::Unauthorized {
            code: status::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Config(msg) => write!(f, "request config error: {msg}"),
            HttpError::Transport(e) => write!(f, "network error: {e}"),
            HttpError::Unauthorized { message, .. } => write!(f, "{message}"),
            HttpError::Server { code, message } => write!(f, "server error ({code}): {message}"),
            HttpError::Client { code, message } => write!(f, "request failed ({code}): {message}"),
        }
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HttpError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        HttpError::Transport(e)
    }
}
