use ioa_core::domain::insights::Insights;
use ioa_core::domain::search::{PageWindow, SearchCriteria, SearchPage};
use ioa_infra::api::{ApiError, SearchApiClient};

use crate::orchestrator::SearchBackend;

impl SearchBackend for SearchApiClient {
    async fn search(
        &self,
        criteria: &SearchCriteria,
        window: PageWindow,
    ) -> Result<SearchPage, ApiError> {
        SearchApiClient::search(self, criteria, window).await
    }

    async fn insights(&self, criteria: &SearchCriteria) -> Result<Insights, ApiError> {
        SearchApiClient::insights(self, criteria).await
    }

    async fn hashtag_suggestions(&self) -> Result<Insights, ApiError> {
        SearchApiClient::hashtag_suggestions(self).await
    }
}
