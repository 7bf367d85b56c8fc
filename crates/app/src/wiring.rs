use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::state::AppState;
use ioa_infra::api::{ApiError, SearchApiClient};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("api client error: {0}")]
    Api(#[from] ApiError),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    let api = SearchApiClient::new(client, &config.api_base_url, &config.insights_interval)?;
    Ok(AppState {
        config: Arc::new(config),
        api,
    })
}
