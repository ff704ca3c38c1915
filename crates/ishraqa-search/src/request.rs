use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::filter::{build_filter_expression, FacetFilter};

/// Sort applied when neither the request nor the index identifier names one
pub const DEFAULT_SORT: &str = "created_at:desc";
pub const DEFAULT_INDEX: &str = "ishraqa";
pub const DEFAULT_HITS_PER_PAGE: usize = 20;

/// A search request as issued by the renderer. Immutable per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Opaque index identifier: `name` or `name:sort`
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page: usize,
    #[serde(default = "default_hits_per_page")]
    pub hits_per_page: usize,
    /// Explicit sort key, wins over the index suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default)]
    pub facet_filters: Vec<FacetFilter>,
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

fn default_hits_per_page() -> usize {
    DEFAULT_HITS_PER_PAGE
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX)
    }
}

impl SearchRequest {
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_string(),
            query: String::new(),
            page: 0,
            hits_per_page: DEFAULT_HITS_PER_PAGE,
            sort: None,
            facet_filters: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_hits_per_page(mut self, hits_per_page: usize) -> Self {
        self.hits_per_page = hits_per_page;
        self
    }

    pub fn with_sort(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }

    pub fn with_facet_filters(mut self, filters: Vec<FacetFilter>) -> Self {
        self.facet_filters = filters;
        self
    }

    /// Backend index name: everything before the first `:`
    pub fn index_name(&self) -> &str {
        self.index
            .split_once(':')
            .map(|(name, _)| name)
            .unwrap_or(&self.index)
    }

    /// Sort key: explicit sort, then the index suffix, then the default.
    pub fn resolved_sort(&self) -> &str {
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            return sort;
        }
        match self.index.split_once(':') {
            Some((_, sort)) if !sort.is_empty() => sort,
            _ => DEFAULT_SORT,
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.hits_per_page)
    }

    /// Reject requests that can only come from a caller bug.
    pub fn validate(&self) -> Result<()> {
        if self.hits_per_page == 0 {
            bail!("hits_per_page must be positive");
        }
        if self.index_name().trim().is_empty() {
            bail!("Index identifier {:?} has no index name", self.index);
        }
        build_filter_expression(&self.facet_filters)?;
        Ok(())
    }

    /// Build the GET URL against `{base_url}/search`.
    pub fn to_url(&self, base_url: &str) -> Result<Url> {
        let endpoint = format!("{}/search", base_url.trim_end_matches('/'));
        let mut url =
            Url::parse(&endpoint).with_context(|| format!("Invalid base URL: {}", base_url))?;

        let filters = build_filter_expression(&self.facet_filters)?;

        {
            let mut params = url.query_pairs_mut();
            if !self.query.is_empty() {
                params.append_pair("q", &self.query);
            }
            params
                .append_pair("index", self.index_name())
                .append_pair("offset", &self.offset().to_string())
                .append_pair("limit", &self.hits_per_page.to_string())
                .append_pair("facets", "*")
                .append_pair("sort", self.resolved_sort());
            if let Some(filters) = filters {
                params.append_pair("filters", &filters);
            }
        }

        Ok(url)
    }
}
