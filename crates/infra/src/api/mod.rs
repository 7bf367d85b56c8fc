pub mod client;
pub mod request;

use thiserror::Error;

pub use client::SearchApiClient;
pub use request::ApiRequest;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
