use crate::error::HttpError;
use crate::status;

/// Whether a failed attempt may be reissued under the retry budget.
///
/// Only the fixed transient set qualifies. Unauthorized outcomes never do;
/// they belong to the refresh path. Config errors surface immediately.
pub(crate) fn should_retry(error: &HttpError) -> bool {
    match error {
        HttpError::Config(_) | HttpError::Unauthorized { .. } => false,
        other => status::is_retryable(other.code()),
    }
}
