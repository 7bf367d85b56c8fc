use crate::domain::insights::Insights;
use crate::domain::search::{SearchCriteria, SearchPage};
use crate::domain::tweet::Tweet;

/// Everything the search screen renders. Only [`SearchState::apply`]
/// produces a new state.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub criteria: SearchCriteria,
    /// Criteria as of the latest submission. Staged filter edits and
    /// `QueryCleared` leave it alone.
    pub submitted: Option<SearchCriteria>,
    pub page: u32,
    pub records: Vec<Tweet>,
    /// Authoritative only once a page response has arrived.
    pub total: u64,
    pub insights: Option<Insights>,
    pub hashtag_suggestions: Vec<String>,
    pub export_records: Vec<Tweet>,
    /// Query the staged export records were fetched for.
    pub export_query: String,
    pub loading: bool,
    pub error: Option<String>,
    /// Minted on every submission; insights and export staging from an
    /// older generation are discarded.
    pub generation: u64,
    /// Minted on every page dispatch; only the latest page response lands.
    pub page_request: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SearchSubmitted { query: String },
    PageRequested { page: u32 },
    PageLoaded { request: u64, page: SearchPage },
    PageFailed { request: u64, message: String },
    ExportStaged {
        generation: u64,
        query: String,
        records: Vec<Tweet>,
    },
    InsightsLoaded { generation: u64, insights: Insights },
    InsightsCleared { generation: u64 },
    SuggestionsLoaded { tags: Vec<String> },
    FilterChanged { criteria: SearchCriteria },
    QueryCleared,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            criteria: SearchCriteria::default(),
            submitted: None,
            page: 1,
            records: Vec::new(),
            total: 0,
            insights: None,
            hashtag_suggestions: Vec::new(),
            export_records: Vec::new(),
            export_query: String::new(),
            loading: false,
            error: None,
            generation: 0,
            page_request: 0,
        }
    }
}

impl SearchState {
    pub fn apply(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::SearchSubmitted { query } => {
                self.criteria = self.criteria.with_query(&query);
                self.submitted = Some(self.criteria.clone());
                self.page = 1;
                self.generation += 1;
            }
            SessionEvent::PageRequested { page } => {
                self.page = page.max(1);
                self.page_request += 1;
                self.loading = true;
            }
            SessionEvent::PageLoaded { request, page } => {
                if request == self.page_request {
                    self.records = page.tweets;
                    self.total = page.total;
                    self.loading = false;
                    self.error = None;
                }
            }
            SessionEvent::PageFailed { request, message } => {
                if request == self.page_request {
                    self.loading = false;
                    self.error = Some(message);
                }
            }
            SessionEvent::ExportStaged {
                generation,
                query,
                records,
            } => {
                if generation == self.generation {
                    self.export_query = query;
                    self.export_records = records;
                }
            }
            SessionEvent::InsightsLoaded { generation, insights } => {
                if generation == self.generation {
                    self.insights = Some(insights);
                }
            }
            SessionEvent::InsightsCleared { generation } => {
                if generation == self.generation {
                    self.insights = None;
                }
            }
            SessionEvent::SuggestionsLoaded { tags } => self.hashtag_suggestions = tags,
            SessionEvent::FilterChanged { criteria } => {
                let query = std::mem::take(&mut self.criteria.query);
                self.criteria = criteria;
                self.criteria.query = query;
            }
            SessionEvent::QueryCleared => {
                self.criteria.query.clear();
                self.page = 1;
            }
        }
        self
    }

    pub fn total_pages(&self) -> u32 {
        crate::domain::search::PageWindow::total_pages(self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(id: &str) -> Tweet {
        Tweet {
            tweetid: id.to_string(),
            ..Tweet::default()
        }
    }

    fn page_of(ids: &[&str], total: u64) -> SearchPage {
        SearchPage {
            page: 1,
            size: 10,
            total,
            tweets: ids.iter().map(|id| tweet(id)).collect(),
        }
    }

    #[test]
    fn initial_total_is_zero() {
        let state = SearchState::default();
        assert_eq!(state.total, 0);
        assert_eq!(state.total_pages(), 0);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn submission_resets_page_and_mints_generation() {
        let state = SearchState {
            page: 4,
            ..SearchState::default()
        }
        .apply(SessionEvent::SearchSubmitted { query: " hello ".into() });
        assert_eq!(state.criteria.query, "hello");
        assert_eq!(state.page, 1);
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn page_load_replaces_records_and_clears_error() {
        let state = SearchState {
            error: Some("boom".into()),
            ..SearchState::default()
        }
        .apply(SessionEvent::PageRequested { page: 1 });
        assert!(state.loading);
        let request = state.page_request;
        let state = state.apply(SessionEvent::PageLoaded {
            request,
            page: page_of(&["1", "2"], 12),
        });
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.total, 12);
    }

    #[test]
    fn page_failure_keeps_prior_records() {
        let state = SearchState::default().apply(SessionEvent::PageRequested { page: 1 });
        let state = state.apply(SessionEvent::PageLoaded {
            request: 1,
            page: page_of(&["1"], 1),
        });
        let state = state
            .apply(SessionEvent::PageRequested { page: 1 })
            .apply(SessionEvent::PageFailed {
                request: 2,
                message: "network down".into(),
            });
        assert_eq!(state.error.as_deref(), Some("network down"));
        assert_eq!(state.records, vec![tweet("1")]);
        assert!(!state.loading);
    }

    #[test]
    fn stale_page_response_is_ignored() {
        let state = SearchState::default()
            .apply(SessionEvent::PageRequested { page: 1 })
            .apply(SessionEvent::PageRequested { page: 2 });
        let state = state.apply(SessionEvent::PageLoaded {
            request: 2,
            page: page_of(&["new"], 20),
        });
        let state = state.apply(SessionEvent::PageLoaded {
            request: 1,
            page: page_of(&["old"], 20),
        });
        assert_eq!(state.records, vec![tweet("new")]);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn insights_from_superseded_search_are_ignored() {
        let state = SearchState::default()
            .apply(SessionEvent::SearchSubmitted { query: "first".into() })
            .apply(SessionEvent::SearchSubmitted { query: "second".into() });
        let stale = Insights {
            top_users: vec![crate::domain::insights::Bucket {
                key: "old".into(),
                doc_count: 1,
            }],
            ..Insights::default()
        };
        let state = state.apply(SessionEvent::InsightsLoaded {
            generation: 1,
            insights: stale,
        });
        assert_eq!(state.insights, None);
        let state = state.apply(SessionEvent::InsightsLoaded {
            generation: 2,
            insights: Insights::default(),
        });
        assert_eq!(state.insights, Some(Insights::default()));
        let state = state.apply(SessionEvent::ExportStaged {
            generation: 1,
            query: "first".into(),
            records: vec![tweet("x")],
        });
        assert!(state.export_records.is_empty());
    }

    #[test]
    fn clearing_query_keeps_filters_and_results() {
        let mut criteria = SearchCriteria::default();
        criteria.set_hashtags(["news"]);
        let state = SearchState::default()
            .apply(SessionEvent::FilterChanged { criteria })
            .apply(SessionEvent::SearchSubmitted { query: "hello".into() })
            .apply(SessionEvent::PageRequested { page: 2 })
            .apply(SessionEvent::PageLoaded {
                request: 1,
                page: page_of(&["1"], 11),
            })
            .apply(SessionEvent::QueryCleared);
        assert_eq!(state.criteria.query, "");
        assert_eq!(state.criteria.hashtags(), ["news"]);
        assert_eq!(state.page, 1);
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn filter_change_keeps_submitted_query() {
        let state = SearchState::default()
            .apply(SessionEvent::SearchSubmitted { query: "hello".into() })
            .apply(SessionEvent::FilterChanged {
                criteria: SearchCriteria::default(),
            });
        assert_eq!(state.criteria.query, "hello");
    }

    #[test]
    fn staged_export_keeps_its_query_after_clear() {
        let state = SearchState::default()
            .apply(SessionEvent::SearchSubmitted { query: "hello".into() })
            .apply(SessionEvent::ExportStaged {
                generation: 1,
                query: "hello".into(),
                records: vec![tweet("1")],
            })
            .apply(SessionEvent::QueryCleared);
        assert_eq!(state.criteria.query, "");
        assert_eq!(state.export_query, "hello");
        assert_eq!(
            state.submitted.as_ref().map(|criteria| criteria.query.as_str()),
            Some("hello")
        );
    }
}
