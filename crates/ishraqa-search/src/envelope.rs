use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::error::SearchFailure;
use crate::request::SearchRequest;
use crate::resolve::{fallback_id, resolve_geo, resolve_id};
use crate::types::{page_count, FacetDistribution, Highlight, Hit, ResultPage};

/// Field holding the backend's marked-up copies of matched fields
const FORMATTED_FIELD: &str = "_formatted";

/// Accepted names for the total hit count, first usable one wins
const TOTAL_COUNT_FIELDS: &[&str] = &["nbHits", "estimatedTotalHits", "totalHits"];

/// Payload of a successful envelope
#[derive(Debug, Default)]
pub struct EnvelopeData {
    pub hits: Vec<Value>,
    pub nb_hits: Option<u64>,
    pub facet_distribution: Option<Value>,
    pub processing_time_ms: Option<u64>,
}

impl EnvelopeData {
    /// Read the `data` object field by field; a missing or mistyped field
    /// falls back instead of failing the envelope.
    pub fn from_object(mut data: Map<String, Value>) -> Self {
        let hits = match data.remove("hits") {
            Some(Value::Array(hits)) => hits,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!(value = %other, "Ignoring non-array hits");
                Vec::new()
            }
        };

        Self {
            hits,
            nb_hits: TOTAL_COUNT_FIELDS
                .iter()
                .find_map(|field| data.get(*field).and_then(count)),
            facet_distribution: data.remove("facetDistribution"),
            processing_time_ms: data.get("processingTimeMS").and_then(count),
        }
    }
}

/// A non-negative integral number, also when sent as `12.0`.
fn count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

/// Decoded `{success: true, data: {...}}` envelope
#[derive(Debug)]
pub struct Envelope {
    pub data: EnvelopeData,
    pub request_id: Option<String>,
}

impl Envelope {
    /// Parse a response body, rejecting anything but a success envelope.
    pub fn from_slice(body: &[u8]) -> Result<Self, SearchFailure> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SearchFailure> {
        let Value::Object(mut root) = value else {
            return Err(SearchFailure::Envelope("body is not an object"));
        };

        if root.get("success").and_then(Value::as_bool) != Some(true) {
            return Err(SearchFailure::Envelope("success flag missing or false"));
        }

        let request_id = match root.get("requestId") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let data = match root.remove("data") {
            Some(Value::Object(data)) => EnvelopeData::from_object(data),
            _ => return Err(SearchFailure::Envelope("data object missing")),
        };

        Ok(Self { data, request_id })
    }

    /// Reshape the envelope into a page for `request`.
    pub fn into_page(self, request: &SearchRequest) -> ResultPage {
        let page_size = request.hits_per_page;
        let EnvelopeData {
            hits: raw_hits,
            nb_hits,
            facet_distribution,
            processing_time_ms,
        } = self.data;

        let returned = raw_hits.len();
        let records: Vec<Map<String, Value>> = raw_hits
            .into_iter()
            .filter_map(|hit| match hit {
                Value::Object(record) => Some(record),
                other => {
                    warn!(value = %other, "Skipping non-object hit");
                    None
                }
            })
            .collect();

        let total_count = nb_hits.unwrap_or(records.len() as u64);

        if records.len() > page_size {
            warn!(
                returned = records.len(),
                page_size, "Backend returned more hits than requested, truncating"
            );
        }

        let mut seen = HashSet::new();
        let hits: Vec<Hit> = records
            .into_iter()
            .take(page_size)
            .map(|record| normalize_hit(record, &mut seen))
            .collect();

        debug!(
            index = request.index_name(),
            returned,
            kept = hits.len(),
            total_count,
            "Normalized search page"
        );

        ResultPage {
            hits,
            total_count,
            page_count: page_count(total_count, page_size),
            page: request.page,
            page_size,
            facet_distribution: facet_distribution
                .map(parse_facets)
                .unwrap_or_default(),
            elapsed_ms: processing_time_ms.unwrap_or(0),
            echoed_query: request.query.clone(),
            index: request.index_name().to_string(),
            search_id: self
                .request_id
                .unwrap_or_else(|| format!("search_{}", uuid::Uuid::new_v4())),
        }
    }
}

/// Derive `id`, `geo` and `highlighted` for one record.
///
/// `seen` holds ids already handed out on this page; a repeated key gets a
/// fallback id so ids never collide within a page.
pub fn normalize_hit(record: Map<String, Value>, seen: &mut HashSet<String>) -> Hit {
    let id = match resolve_id(&record) {
        Some(id) if !seen.contains(&id) => id,
        Some(id) => {
            warn!(id = %id, "Duplicate hit id on page, using fallback");
            fallback_id()
        }
        None => fallback_id(),
    };
    seen.insert(id.clone());

    Hit {
        geo: resolve_geo(&record),
        highlighted: highlights(&record),
        id,
        record,
    }
}

fn highlights(record: &Map<String, Value>) -> BTreeMap<String, Highlight> {
    let Some(formatted) = record.get(FORMATTED_FIELD).and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    formatted
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), Highlight { value }))
        })
        .collect()
}

fn parse_facets(value: Value) -> FacetDistribution {
    let Value::Object(fields) = value else {
        return FacetDistribution::new();
    };

    fields
        .into_iter()
        .filter_map(|(field, counts)| {
            let Value::Object(counts) = counts else {
                warn!(field = %field, "Skipping malformed facet");
                return None;
            };
            let counts: BTreeMap<String, u64> = counts
                .into_iter()
                .filter_map(|(value, count)| count.as_u64().map(|c| (value, c)))
                .collect();
            Some((field, counts))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Geo;
    use serde_json::json;

    fn page_from(body: Value, request: &SearchRequest) -> ResultPage {
        Envelope::from_value(body).unwrap().into_page(request)
    }

    #[test]
    fn test_rejects_missing_success() {
        let err = Envelope::from_value(json!({"data": {"hits": []}})).unwrap_err();
        assert_eq!(err.kind(), "envelope");
        let err = Envelope::from_value(json!({"success": false, "data": {}})).unwrap_err();
        assert_eq!(err.kind(), "envelope");
    }

    #[test]
    fn test_rejects_missing_data() {
        let err = Envelope::from_value(json!({"success": true})).unwrap_err();
        assert_eq!(err.kind(), "envelope");
        let err = Envelope::from_value(json!({"success": true, "data": null})).unwrap_err();
        assert_eq!(err.kind(), "envelope");
    }

    #[test]
    fn test_rejects_unparsable_body() {
        let err = Envelope::from_slice(b"<html>oops</html>").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_total_falls_back_to_hit_count() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [{"id": "a"}, {"id": "b"}]}}),
            &req,
        );
        assert_eq!(page.total_count, 2);
        assert_eq!(page.page_count, 1);
        assert!(page.facet_distribution.is_empty());
    }

    #[test]
    fn test_total_count_aliases() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [], "estimatedTotalHits": 41}}),
            &req,
        );
        assert_eq!(page.total_count, 41);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_hit_order_preserved() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [{"id": "z"}, {"id": "a"}, {"id": "m"}]}}),
            &req,
        );
        let ids: Vec<&str> = page.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_truncates_to_page_size() {
        let req = SearchRequest::new("ishraqa").with_hits_per_page(2);
        let page = page_from(
            json!({"success": true, "data": {"hits": [{"id": 1}, {"id": 2}, {"id": 3}], "nbHits": 3}}),
            &req,
        );
        assert_eq!(page.hits.len(), 2);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_count, 2);
    }

    #[test]
    fn test_non_object_hits_skipped() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [{"id": "a"}, 7, null, {"id": "b"}]}}),
            &req,
        );
        assert_eq!(page.hits.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_do_not_collide() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [{"id": "a"}, {"id": "a"}, {}, {}]}}),
            &req,
        );
        let ids: HashSet<&str> = page.hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(page.hits[0].id, "a");
    }

    #[test]
    fn test_geo_and_highlights() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [
                {"id": "a", "_geo": {"lat": 24.7, "lng": 46.6}, "name": "Tower",
                 "_formatted": {"name": "<em>Tower</em>", "floors": 12, "note": null}},
                {"id": "b", "lat": "24.7", "long": "46.6"},
                {"id": "c", "name": "No coordinates"}
            ]}}),
            &req,
        );

        let a = &page.hits[0];
        assert_eq!(a.geo, Some(Geo::new(24.7, 46.6)));
        assert_eq!(a.highlighted["name"].value, "<em>Tower</em>");
        assert_eq!(a.highlighted["floors"].value, "12");
        assert!(!a.highlighted.contains_key("note"));
        assert_eq!(a.field("name"), Some(&json!("Tower")));

        assert_eq!(page.hits[1].geo, Some(Geo::new(24.7, 46.6)));
        assert!(page.hits[1].highlighted.is_empty());
        assert_eq!(page.hits[2].geo, None);
    }

    #[test]
    fn test_facets_and_metadata() {
        let req = SearchRequest::new("ishraqa:price:asc").with_query("villa");
        let page = page_from(
            json!({
                "success": true,
                "requestId": "req-9",
                "data": {
                    "hits": [],
                    "nbHits": 0,
                    "processingTimeMS": 7,
                    "facetDistribution": {
                        "district": {"X": 3, "Y": 1, "bad": "many"},
                        "broken": 5
                    }
                }
            }),
            &req,
        );
        assert_eq!(page.elapsed_ms, 7);
        assert_eq!(page.search_id, "req-9");
        assert_eq!(page.index, "ishraqa");
        assert_eq!(page.echoed_query, "villa");
        assert_eq!(page.facet_distribution["district"]["X"], 3);
        assert!(!page.facet_distribution["district"].contains_key("bad"));
        assert!(!page.facet_distribution.contains_key("broken"));
    }

    #[test]
    fn test_several_total_count_keys() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {
                "hits": [{"id": "a"}],
                "nbHits": 1,
                "estimatedTotalHits": 1,
                "totalHits": 9
            }}),
            &req,
        );
        assert_eq!(page.total_count, 1);
        assert_eq!(page.hits.len(), 1);
    }

    #[test]
    fn test_first_usable_total_count_wins() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {"hits": [], "nbHits": "lots", "totalHits": 12.0}}),
            &req,
        );
        assert_eq!(page.total_count, 12);
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn test_null_hits_are_an_empty_list() {
        let req = SearchRequest::new("ishraqa").with_query("villa");
        let page = page_from(
            json!({"success": true, "data": {"hits": null, "nbHits": 0}}),
            &req,
        );
        assert!(page.hits.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.page_count, 0);
        assert_eq!(page.echoed_query, "villa");

        let page = page_from(json!({"success": true, "data": {"hits": "nope"}}), &req);
        assert!(page.hits.is_empty());
    }

    #[test]
    fn test_mistyped_counts_fall_back() {
        let req = SearchRequest::new("ishraqa");
        let page = page_from(
            json!({"success": true, "data": {
                "hits": [{"id": "a"}, {"id": "b"}],
                "nbHits": -4,
                "processingTimeMS": 2.5,
                "facetDistribution": null
            }}),
            &req,
        );
        assert_eq!(page.total_count, 2);
        assert_eq!(page.elapsed_ms, 0);
        assert!(page.facet_distribution.is_empty());
    }
}
