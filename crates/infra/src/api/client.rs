use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::request::{parse_base_url, ApiRequest};
use crate::api::ApiError;
use ioa_core::domain::insights::Insights;
use ioa_core::domain::search::{PageWindow, SearchCriteria, SearchPage};

/// Thin GET/JSON client for the remote search and insights API.
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    http: Client,
    base_url: Url,
    insights_interval: String,
}

impl SearchApiClient {
    pub fn new(http: Client, base_url: &str, insights_interval: &str) -> Result<Self, ApiError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            insights_interval: insights_interval.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        window: PageWindow,
    ) -> Result<SearchPage, ApiError> {
        self.get_json(ApiRequest::Search { criteria, window }).await
    }

    pub async fn insights(&self, criteria: &SearchCriteria) -> Result<Insights, ApiError> {
        self.get_json(ApiRequest::Insights {
            criteria,
            interval: &self.insights_interval,
        })
        .await
    }

    /// Global aggregates with no query; callers use the top hashtags.
    pub async fn hashtag_suggestions(&self) -> Result<Insights, ApiError> {
        self.get_json(ApiRequest::HashtagSuggestions).await
    }

    async fn get_json<T>(&self, request: ApiRequest<'_>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = request.url(&self.base_url)?;
        debug!(%url, "api request");
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}
