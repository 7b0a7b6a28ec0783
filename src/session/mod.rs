pub mod auth;
pub mod store;

pub use auth::{AuthClient, TokenRefresher};
pub use store::{SessionStore, SessionTokens};
