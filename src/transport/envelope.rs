use serde::Deserialize;
use serde_json::Value;

use crate::error::HttpError;
use crate::status;

/// The `{code, message, data}` wrapper every server response uses.
///
/// Older backend revisions send `msg` instead of `message`; both are
/// accepted.
#[derive(Debug, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: u16,
    #[serde(alias = "msg", default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl Envelope<Value> {
    /// Unwraps the envelope into `(data, message)` or classifies the code
    /// into the error taxonomy.
    pub(crate) fn into_result(self) -> Result<(Value, String), HttpError> {
        if status::is_success(self.code) {
            Ok((self.data.unwrap_or(Value::Null), self.message))
        } else {
            Err(HttpError::from_code(self.code, self.message))
        }
    }
}
