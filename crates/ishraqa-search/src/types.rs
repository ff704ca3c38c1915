use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Facet field -> facet value -> count
pub type FacetDistribution = BTreeMap<String, BTreeMap<String, u64>>;

/// Geographic point resolved from a hit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Geo {
    pub lat: f64,
    pub lng: f64,
}

impl Geo {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Highlighted (marked-up) rendition of a single field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    pub value: String,
}

/// One normalized search result.
///
/// `record` keeps every backend field untouched; `id`, `geo` and
/// `highlighted` are derived during normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
    #[serde(default)]
    pub highlighted: BTreeMap<String, Highlight>,
    #[serde(default)]
    pub record: Map<String, Value>,
}

impl Hit {
    /// Raw backend field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }
}

/// One normalized page of results, created fresh per request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub hits: Vec<Hit>,
    pub total_count: u64,
    pub page_count: u64,
    pub page: usize,
    pub page_size: usize,
    pub facet_distribution: FacetDistribution,
    pub elapsed_ms: u64,
    pub echoed_query: String,
    pub index: String,
    pub search_id: String,
}

impl ResultPage {
    /// Empty but well-formed page, used whenever the backend call fails.
    pub fn empty(query: &str, index: &str, page: usize, page_size: usize) -> Self {
        Self {
            hits: Vec::new(),
            total_count: 0,
            page_count: 0,
            page,
            page_size,
            facet_distribution: FacetDistribution::new(),
            elapsed_ms: 0,
            echoed_query: query.to_string(),
            index: index.to_string(),
            search_id: format!("error_search_{}", uuid::Uuid::new_v4()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Number of pages needed for `total_count` hits.
///
/// Zero hits is always zero pages, whatever the page size.
pub fn page_count(total_count: u64, page_size: usize) -> u64 {
    if total_count == 0 || page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64)
}
