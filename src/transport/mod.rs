pub mod cache;
pub mod envelope;
pub mod http_client;
pub mod request;

pub use envelope::Envelope;
pub use http_client::HttpTransport;
pub use request::ApiRequest;
