use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use ioa_core::domain::insights::Insights;
use ioa_core::domain::search::{CriteriaField, PageWindow, SearchCriteria, SearchPage};
use ioa_core::domain::tweet::Tweet;
use ioa_core::export::{export_filename, to_csv, CsvError};
use ioa_core::session::{SearchState, SessionEvent};
use ioa_core::CoreError;
use ioa_infra::api::ApiError;

/// The remote operations the orchestrator sequences.
pub trait SearchBackend {
    fn search(
        &self,
        criteria: &SearchCriteria,
        window: PageWindow,
    ) -> impl Future<Output = Result<SearchPage, ApiError>> + Send;

    fn insights(
        &self,
        criteria: &SearchCriteria,
    ) -> impl Future<Output = Result<Insights, ApiError>> + Send;

    fn hashtag_suggestions(&self) -> impl Future<Output = Result<Insights, ApiError>> + Send;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("page {page} out of range (1..={total_pages})")]
    PageOutOfRange { page: u32, total_pages: u32 },
    #[error("invalid filter: {0}")]
    Filter(#[from] CoreError),
    #[error("csv error: {0}")]
    Csv(#[from] CsvError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Orchestrator<B> {
    backend: B,
    state: SearchState,
    export_delay: Duration,
    /// Upper bound on pages fetched for one export; 0 means no bound.
    export_max_pages: u32,
}

impl<B: SearchBackend> Orchestrator<B> {
    pub fn new(backend: B, export_delay: Duration) -> Self {
        Self {
            backend,
            state: SearchState::default(),
            export_delay,
            export_max_pages: 0,
        }
    }

    pub fn with_export_max_pages(mut self, max_pages: u32) -> Self {
        self.export_max_pages = max_pages;
        self
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn dispatch(&mut self, event: SessionEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
    }

    /// Session start: loads the autocomplete source once.
    pub async fn start(&mut self) {
        self.fetch_global_hashtag_suggestions().await;
    }

    pub async fn fetch_global_hashtag_suggestions(&mut self) {
        match self.backend.hashtag_suggestions().await {
            Ok(insights) => {
                let tags = insights.suggestions();
                debug!(count = tags.len(), "hashtag suggestions loaded");
                self.dispatch(SessionEvent::SuggestionsLoaded { tags });
            }
            Err(err) => warn!(error = %err, "hashtag suggestions fetch failed"),
        }
    }

    /// Returns once the first page and the insights have settled. Export
    /// records are staged separately by [`Orchestrator::stage_export`].
    pub async fn submit_search(&mut self, raw_query: &str) {
        self.dispatch(SessionEvent::SearchSubmitted {
            query: raw_query.to_string(),
        });
        let generation = self.state.generation;
        let criteria = self.state.criteria.clone();
        info!(query = %criteria.query, generation, "search submitted");

        self.dispatch(SessionEvent::PageRequested { page: 1 });
        let request = self.state.page_request;
        let (page_result, insights_result) = tokio::join!(
            self.backend.search(&criteria, PageWindow::new(1)),
            load_insights(&self.backend, &criteria),
        );

        self.settle_page(request, page_result);
        self.settle_insights(generation, insights_result);
    }

    /// Fetches every page of the latest submission into the export staging
    /// area. The page count comes from the last total a page response
    /// reported, so a failed first page falls back to the previous total.
    pub async fn stage_export(&mut self) {
        let Some(criteria) = self.state.submitted.clone() else {
            debug!("no search submitted; nothing to stage");
            return;
        };
        let generation = self.state.generation;
        let records = self.fetch_all_pages(&criteria, self.state.total).await;
        self.dispatch(SessionEvent::ExportStaged {
            generation,
            query: criteria.query,
            records,
        });
    }

    pub async fn change_page(&mut self, page: u32) -> Result<(), SessionError> {
        if !PageWindow::contains(page, self.state.total) {
            return Err(SessionError::PageOutOfRange {
                page,
                total_pages: self.state.total_pages(),
            });
        }
        self.fetch_page(page).await;
        Ok(())
    }

    /// Stages one filter edit. Nothing is fetched until the next submission.
    pub fn change_filter(&mut self, field: CriteriaField) -> Result<(), SessionError> {
        let mut criteria = self.state.criteria.clone();
        criteria.apply(field)?;
        self.dispatch(SessionEvent::FilterChanged { criteria });
        Ok(())
    }

    pub fn clear_search(&mut self) {
        self.dispatch(SessionEvent::QueryCleared);
    }

    pub async fn fetch_page(&mut self, page: u32) {
        self.dispatch(SessionEvent::PageRequested { page });
        let request = self.state.page_request;
        let criteria = self.state.criteria.clone();
        let result = self.backend.search(&criteria, PageWindow::new(page)).await;
        self.settle_page(request, result);
    }

    /// Fetches every page for `total` records one request at a time, up to the
    /// configured page cap. Stops at the first failure and returns what was
    /// gathered before it.
    pub async fn fetch_all_pages(&self, criteria: &SearchCriteria, total: u64) -> Vec<Tweet> {
        let mut total_pages = PageWindow::total_pages(total);
        if self.export_max_pages > 0 && total_pages > self.export_max_pages {
            info!(total_pages, max_pages = self.export_max_pages, "export page count capped");
            total_pages = self.export_max_pages;
        }
        let mut records = Vec::new();
        for page in 1..=total_pages {
            if page > 1 && !self.export_delay.is_zero() {
                sleep(self.export_delay).await;
            }
            match self.backend.search(criteria, PageWindow::new(page)).await {
                Ok(result) => records.extend(result.tweets),
                Err(err) => {
                    warn!(error = %err, page, total_pages, "export page fetch failed; keeping partial results");
                    break;
                }
            }
        }
        debug!(count = records.len(), total_pages, "export records staged");
        records
    }

    pub async fn fetch_query_insights(&mut self) {
        let generation = self.state.generation;
        let criteria = self.state.criteria.clone();
        let result = load_insights(&self.backend, &criteria).await;
        self.settle_insights(generation, result);
    }

    /// Writes staged export records under `dir`, named after the query they
    /// were fetched for. Returns `None` when there is nothing to export.
    pub async fn export_csv(
        &self,
        dir: &Path,
        today: NaiveDate,
    ) -> Result<Option<PathBuf>, SessionError> {
        if self.state.export_records.is_empty() {
            return Ok(None);
        }
        let csv = to_csv(&self.state.export_records)?;
        let path = dir.join(export_filename(&self.state.export_query, today));
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, csv).await?;
        info!(
            path = %path.display(),
            records = self.state.export_records.len(),
            "csv export written"
        );
        Ok(Some(path))
    }

    fn settle_page(&mut self, request: u64, result: Result<SearchPage, ApiError>) {
        match result {
            Ok(page) => {
                debug!(total = page.total, shown = page.tweets.len(), "search page loaded");
                self.dispatch(SessionEvent::PageLoaded { request, page });
            }
            Err(err) => {
                warn!(error = %err, "search page fetch failed");
                self.dispatch(SessionEvent::PageFailed {
                    request,
                    message: err.to_string(),
                });
            }
        }
    }

    fn settle_insights(&mut self, generation: u64, result: Option<Result<Insights, ApiError>>) {
        match result {
            None => self.dispatch(SessionEvent::InsightsCleared { generation }),
            Some(Ok(insights)) => self.dispatch(SessionEvent::InsightsLoaded {
                generation,
                insights,
            }),
            Some(Err(err)) => warn!(error = %err, "insights fetch failed"),
        }
    }
}

/// `None` when the query is empty: there is nothing to aggregate.
async fn load_insights<B: SearchBackend>(
    backend: &B,
    criteria: &SearchCriteria,
) -> Option<Result<Insights, ApiError>> {
    if criteria.query.is_empty() {
        return None;
    }
    Some(backend.insights(criteria).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use ioa_core::domain::insights::Bucket;
    use ioa_infra::api::ApiRequest;
    use reqwest::Url;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Search(SearchCriteria, PageWindow),
        Insights(SearchCriteria),
        Suggestions,
    }

    #[derive(Default)]
    struct Script {
        total: u64,
        fail_search: bool,
        fail_page: Option<u32>,
        insights: Option<Insights>,
    }

    #[derive(Default)]
    struct FakeBackend {
        script: Mutex<Script>,
        calls: Mutex<Vec<Call>>,
    }

    impl FakeBackend {
        fn with_total(total: u64) -> Self {
            let backend = Self::default();
            backend.script.lock().unwrap().total = total;
            backend
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn search_pages(&self) -> Vec<u32> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Search(_, window) => Some(window.page),
                    _ => None,
                })
                .collect()
        }

        fn unavailable() -> ApiError {
            ApiError::Status {
                status: 503,
                url: "http://test/search".to_string(),
            }
        }
    }

    impl SearchBackend for FakeBackend {
        async fn search(
            &self,
            criteria: &SearchCriteria,
            window: PageWindow,
        ) -> Result<SearchPage, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Search(criteria.clone(), window));
            let script = self.script.lock().unwrap();
            if script.fail_search || script.fail_page == Some(window.page) {
                return Err(Self::unavailable());
            }
            let offset = u64::from(window.page - 1) * u64::from(window.size);
            let count = script.total.saturating_sub(offset).min(u64::from(window.size));
            let tweets = (0..count)
                .map(|index| Tweet {
                    tweetid: format!("{}-{index}", window.page),
                    ..Tweet::default()
                })
                .collect();
            Ok(SearchPage {
                page: window.page,
                size: window.size,
                total: script.total,
                tweets,
            })
        }

        async fn insights(&self, criteria: &SearchCriteria) -> Result<Insights, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Insights(criteria.clone()));
            self.script
                .lock()
                .unwrap()
                .insights
                .clone()
                .ok_or_else(Self::unavailable)
        }

        async fn hashtag_suggestions(&self) -> Result<Insights, ApiError> {
            self.calls.lock().unwrap().push(Call::Suggestions);
            self.script
                .lock()
                .unwrap()
                .insights
                .clone()
                .ok_or_else(Self::unavailable)
        }
    }

    fn orchestrator(backend: FakeBackend) -> Orchestrator<FakeBackend> {
        Orchestrator::new(backend, Duration::ZERO)
    }

    fn search_url(call: &Call) -> String {
        let base = Url::parse("http://ioarchive.com").unwrap();
        match call {
            Call::Search(criteria, window) => ApiRequest::Search {
                criteria,
                window: *window,
            }
            .url(&base)
            .unwrap()
            .to_string(),
            other => panic!("not a search call: {other:?}"),
        }
    }

    fn sample_insights() -> Insights {
        Insights {
            top_hashtags: vec![Bucket {
                key: "#news".into(),
                doc_count: 3,
            }],
            ..Insights::default()
        }
    }

    #[tokio::test]
    async fn submit_then_change_page_reuses_criteria() {
        let mut session = orchestrator(FakeBackend::with_total(20));
        session.submit_search("hello").await;
        session.change_page(2).await.unwrap();

        let searches: Vec<Call> = session
            .backend()
            .calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Search(..)))
            .collect();
        assert_eq!(searches.len(), 2);
        assert_eq!(
            search_url(&searches[0]),
            "http://ioarchive.com/search?query=hello&page=1&size=10&language=&sort_by="
        );
        assert_eq!(
            search_url(&searches[1]),
            "http://ioarchive.com/search?query=hello&page=2&size=10&language=&sort_by="
        );
        assert_eq!(session.state().page, 2);
        assert_eq!(session.state().records[0].tweetid, "2-0");
    }

    #[tokio::test]
    async fn hashtag_filters_are_sent_bare() {
        let mut session = orchestrator(FakeBackend::with_total(1));
        session
            .change_filter(CriteriaField::AddHashtag("#news".into()))
            .unwrap();
        session
            .change_filter(CriteriaField::AddHashtag("politics".into()))
            .unwrap();
        session.submit_search("hello").await;
        let first = session.backend().calls().into_iter().next().unwrap();
        assert!(search_url(&first).ends_with("hashtags=news&hashtags=politics"));
    }

    #[tokio::test]
    async fn submit_returns_after_first_page() {
        let backend = FakeBackend::with_total(100_000);
        backend.script.lock().unwrap().insights = Some(sample_insights());
        let mut session = orchestrator(backend);
        session.submit_search("hello").await;

        assert_eq!(session.backend().search_pages(), vec![1]);
        let state = session.state();
        assert_eq!(state.records.len(), 10);
        assert_eq!(state.total, 100_000);
        assert_eq!(state.insights, Some(sample_insights()));
        assert!(state.export_records.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn stage_export_fetches_every_page() {
        let mut session = orchestrator(FakeBackend::with_total(25));
        session.submit_search("hello").await;
        session.stage_export().await;

        assert_eq!(session.backend().search_pages(), vec![1, 1, 2, 3]);
        let state = session.state();
        assert_eq!(state.export_records.len(), 25);
        assert_eq!(state.export_records[0].tweetid, "1-0");
        assert_eq!(state.export_records[24].tweetid, "3-4");
        assert_eq!(state.export_query, "hello");
    }

    #[tokio::test]
    async fn stage_export_before_any_search_does_nothing() {
        let mut session = orchestrator(FakeBackend::with_total(25));
        session.stage_export().await;
        assert!(session.backend().calls().is_empty());
        assert!(session.state().export_records.is_empty());
    }

    #[tokio::test]
    async fn export_page_cap_bounds_requests() {
        let mut session = orchestrator(FakeBackend::with_total(45)).with_export_max_pages(2);
        session.submit_search("hello").await;
        session.stage_export().await;

        assert_eq!(session.backend().search_pages(), vec![1, 1, 2]);
        assert_eq!(session.state().export_records.len(), 20);
    }

    #[tokio::test]
    async fn fetch_all_pages_stops_at_first_failure() {
        let backend = FakeBackend::with_total(45);
        backend.script.lock().unwrap().fail_page = Some(3);
        let session = orchestrator(backend);
        let criteria = SearchCriteria::default().with_query("hello");
        let records = session.fetch_all_pages(&criteria, 45).await;

        assert_eq!(records.len(), 20);
        assert_eq!(session.backend().search_pages(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn fetch_all_pages_with_no_results_issues_nothing() {
        let session = orchestrator(FakeBackend::with_total(0));
        let records = session.fetch_all_pages(&SearchCriteria::default(), 0).await;
        assert!(records.is_empty());
        assert!(session.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn primary_failure_sets_error_and_keeps_records() {
        let backend = FakeBackend::with_total(5);
        backend.script.lock().unwrap().fail_search = true;
        let mut session = orchestrator(backend);

        session.submit_search("hello").await;
        assert!(session.state().error.is_some());
        assert!(session.state().records.is_empty());
        assert!(!session.state().loading);

        session.backend().script.lock().unwrap().fail_search = false;
        session.submit_search("hello").await;
        assert_eq!(session.state().error, None);
        assert_eq!(session.state().records.len(), 5);

        session.backend().script.lock().unwrap().fail_search = true;
        session.submit_search("hello again").await;
        assert!(session.state().error.is_some());
        assert_eq!(session.state().records.len(), 5);
    }

    #[tokio::test]
    async fn export_falls_back_to_previous_total_when_page_fails() {
        let mut session = orchestrator(FakeBackend::with_total(15));
        session.submit_search("hello").await;
        assert_eq!(session.state().total, 15);

        session.backend().script.lock().unwrap().fail_page = Some(1);
        session.submit_search("hello again").await;
        assert!(session.state().error.is_some());
        assert_eq!(session.state().total, 15);

        session.backend().script.lock().unwrap().fail_page = None;
        session.stage_export().await;
        assert_eq!(session.backend().search_pages(), vec![1, 1, 1, 2]);
        assert_eq!(session.state().export_records.len(), 15);
        assert_eq!(session.state().export_query, "hello again");
    }

    #[tokio::test]
    async fn empty_query_clears_insights_without_request() {
        let backend = FakeBackend::with_total(3);
        backend.script.lock().unwrap().insights = Some(sample_insights());
        let mut session = orchestrator(backend);
        session.submit_search("hello").await;
        assert!(session.state().insights.is_some());

        session.submit_search("   ").await;
        assert_eq!(session.state().insights, None);
        let insight_calls = session
            .backend()
            .calls()
            .iter()
            .filter(|call| matches!(call, Call::Insights(_)))
            .count();
        assert_eq!(insight_calls, 1);
        assert_eq!(session.state().records.len(), 3);
    }

    #[tokio::test]
    async fn insights_failure_is_not_surfaced() {
        let backend = FakeBackend::with_total(3);
        backend.script.lock().unwrap().insights = Some(sample_insights());
        let mut session = orchestrator(backend);
        session.submit_search("hello").await;

        session.backend().script.lock().unwrap().insights = None;
        session.submit_search("other").await;
        assert_eq!(session.state().error, None);
        assert_eq!(session.state().insights, Some(sample_insights()));
    }

    #[tokio::test]
    async fn change_page_rejects_out_of_range() {
        let mut session = orchestrator(FakeBackend::with_total(20));
        let err = session.change_page(1).await.unwrap_err();
        assert!(matches!(err, SessionError::PageOutOfRange { total_pages: 0, .. }));

        session.submit_search("hello").await;
        assert!(session.change_page(3).await.is_err());
        assert!(session.change_page(0).await.is_err());
        assert_eq!(session.backend().search_pages(), vec![1]);
    }

    #[tokio::test]
    async fn filter_changes_are_staged_not_fetched() {
        let mut session = orchestrator(FakeBackend::with_total(20));
        session
            .change_filter(CriteriaField::Language(Some("en".into())))
            .unwrap();
        assert!(session.backend().calls().is_empty());
        assert_eq!(session.state().criteria.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn clear_search_keeps_filters_and_results() {
        let mut session = orchestrator(FakeBackend::with_total(4));
        session
            .change_filter(CriteriaField::AddHashtag("news".into()))
            .unwrap();
        session.submit_search("hello").await;
        session.clear_search();
        let state = session.state();
        assert_eq!(state.criteria.query, "");
        assert_eq!(state.criteria.hashtags(), ["news"]);
        assert_eq!(state.records.len(), 4);
    }

    #[tokio::test]
    async fn start_loads_suggestions() {
        let backend = FakeBackend::default();
        backend.script.lock().unwrap().insights = Some(sample_insights());
        let mut session = orchestrator(backend);
        session.start().await;
        assert_eq!(session.state().hashtag_suggestions, vec!["news"]);
        assert_eq!(session.backend().calls(), vec![Call::Suggestions]);
    }

    #[tokio::test]
    async fn export_csv_writes_staged_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = orchestrator(FakeBackend::with_total(12));
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert!(session.export_csv(dir.path(), today).await.unwrap().is_none());

        session.submit_search("hello world").await;
        assert!(session.export_csv(dir.path(), today).await.unwrap().is_none());
        session.stage_export().await;
        let path = session.export_csv(dir.path(), today).await.unwrap().unwrap();
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("tweets_export_hello_world_2025-03-15.csv")
        );
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 13);
    }

    #[tokio::test]
    async fn export_file_is_named_after_the_staged_query() {
        let dir = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let mut session = orchestrator(FakeBackend::with_total(3));
        session.submit_search("first").await;
        session.stage_export().await;

        session.clear_search();
        let path = session.export_csv(dir.path(), today).await.unwrap().unwrap();
        assert!(path.ends_with("tweets_export_first_2025-03-15.csv"));

        session.submit_search("second").await;
        let path = session.export_csv(dir.path(), today).await.unwrap().unwrap();
        assert!(path.ends_with("tweets_export_first_2025-03-15.csv"));
    }
}
