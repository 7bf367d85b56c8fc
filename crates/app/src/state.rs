use std::sync::Arc;

use crate::config::AppConfig;
use ioa_infra::api::SearchApiClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: SearchApiClient,
}
