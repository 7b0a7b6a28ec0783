pub mod config;

pub(crate) mod constants;

pub mod error;

pub mod gateway;

pub mod notify;

pub mod session;

pub mod status;

pub mod transport;

pub mod utils;

pub use config::Config;
pub use error::HttpError;
pub use gateway::HttpGateway;
pub use session::{SessionStore, TokenRefresher};
pub use transport::ApiRequest;
