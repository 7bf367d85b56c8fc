use reqwest::Url;

use crate::api::ApiError;
use ioa_core::domain::search::{PageWindow, SearchCriteria};
use ioa_core::types::sort::SortOrder;

const SEARCH_PATH: &str = "search";
const INSIGHTS_PATH: &str = "insights";

/// One GET against the search API. Search and insights share the filter
/// encoding; only search carries paging and sort.
#[derive(Debug, Clone, Copy)]
pub enum ApiRequest<'a> {
    Search {
        criteria: &'a SearchCriteria,
        window: PageWindow,
    },
    Insights {
        criteria: &'a SearchCriteria,
        interval: &'a str,
    },
    HashtagSuggestions,
}

impl ApiRequest<'_> {
    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::Search { .. } => SEARCH_PATH,
            ApiRequest::Insights { .. } | ApiRequest::HashtagSuggestions => INSIGHTS_PATH,
        }
    }

    pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
        let mut url = endpoint_url(base, self.path())?;
        match self {
            ApiRequest::Search { criteria, window } => {
                url.query_pairs_mut()
                    .append_pair("query", &criteria.query)
                    .append_pair("page", &window.page.to_string())
                    .append_pair("size", &window.size.to_string())
                    .extend_pairs(filter_pairs(criteria, Some(criteria.sort)));
            }
            ApiRequest::Insights { criteria, interval } => {
                url.query_pairs_mut()
                    .append_pair("query", &criteria.query)
                    .extend_pairs(filter_pairs(criteria, None))
                    .append_pair("interval", interval);
            }
            ApiRequest::HashtagSuggestions => {}
        }
        Ok(url)
    }
}

/// Filter parameters shared by every criteria-driven endpoint, in wire order.
/// `sort_by` sits between the date bounds and the hashtags when present.
fn filter_pairs(
    criteria: &SearchCriteria,
    sort: Option<SortOrder>,
) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("language", criteria.language_param().to_string())];
    if let Some((from, to)) = criteria.date_range.query_bounds() {
        pairs.push(("from", from));
        pairs.push(("to", to));
    }
    if let Some(sort) = sort {
        pairs.push(("sort_by", sort.as_param().to_string()));
    }
    pairs.extend(criteria.hashtags().iter().map(|tag| ("hashtags", tag.clone())));
    pairs
}

pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

fn endpoint_url(base: &Url, path: &str) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(path);
    Ok(url)
}
