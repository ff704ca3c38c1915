use anyhow::Result;
use ishraqa_search::listing::UNSPECIFIED_LABEL;
use ishraqa_search::{
    FacetFilter, HttpSearchClient, ResultPage, SearchClient, SearchRequest, RIYADH,
};
use tracing::info;

use crate::config::Config;

/// Options of one `search` invocation
pub struct SearchArgs {
    pub query: String,
    pub index: Option<String>,
    pub page: usize,
    pub hits_per_page: Option<usize>,
    pub sort: Option<String>,
    pub filters: Vec<String>,
    pub json: bool,
}

pub async fn execute(args: SearchArgs, config: &Config) -> Result<()> {
    let request = build_request(&args, config);
    info!(index = %request.index, query = %request.query, "Running search");

    let client = HttpSearchClient::new(config.backend.clone())?;
    let page = client.search(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!("{}", render_table(&page));
    }
    Ok(())
}

fn build_request(args: &SearchArgs, config: &Config) -> SearchRequest {
    let index = args.index.as_deref().unwrap_or(&config.search.index);
    let mut request = SearchRequest::new(index)
        .with_query(&args.query)
        .with_page(args.page)
        .with_hits_per_page(args.hits_per_page.unwrap_or(config.search.hits_per_page))
        .with_facet_filters(parse_filters(&args.filters));

    if let Some(sort) = args.sort.as_deref().or(config.search.sort.as_deref()) {
        request = request.with_sort(sort);
    }
    request
}

/// `--filter a:1,a:2 --filter b:3` -> `[[a:1, a:2], b:3]`
pub fn parse_filters(raw: &[String]) -> Vec<FacetFilter> {
    raw.iter()
        .map(|arg| {
            let tokens: Vec<&str> = arg
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() == 1 {
                FacetFilter::single(tokens[0])
            } else {
                FacetFilter::any_of(tokens)
            }
        })
        .collect()
}

fn render_table(page: &ResultPage) -> String {
    let mut out = format!(
        "{} results for {:?} (page {}/{}, {} ms)\n",
        page.total_count,
        page.echoed_query,
        if page.page_count == 0 { 0 } else { page.page + 1 },
        page.page_count,
        page.elapsed_ms
    );

    for (i, hit) in page.hits.iter().enumerate() {
        let distance = hit
            .distance_from(RIYADH)
            .map(|km| format!("{:.1} كم من الرياض", km))
            .unwrap_or_else(|| UNSPECIFIED_LABEL.to_string());
        out.push_str(&format!(
            "{:>3}. {} | {} | {} | {}\n",
            page.page * page.page_size + i + 1,
            hit.title().unwrap_or("مشروع غير مسمى"),
            hit.status_label(),
            hit.district_label(),
            distance
        ));
    }

    if !page.facet_distribution.is_empty() {
        for (field, counts) in &page.facet_distribution {
            let values: Vec<String> = counts.iter().map(|(v, c)| format!("{} ({})", v, c)).collect();
            out.push_str(&format!("  {}: {}\n", field, values.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ishraqa_search::Envelope;
    use serde_json::json;

    fn args(filters: &[&str]) -> SearchArgs {
        SearchArgs {
            query: "villa".into(),
            index: None,
            page: 1,
            hits_per_page: None,
            sort: None,
            filters: filters.iter().map(|s| s.to_string()).collect(),
            json: false,
        }
    }

    #[test]
    fn test_parse_filters() {
        let filters = parse_filters(&["district:X, district:Y".into(), "status:Sold".into()]);
        assert_eq!(
            filters,
            vec![
                FacetFilter::any_of(["district:X", "district:Y"]),
                FacetFilter::single("status:Sold"),
            ]
        );
    }

    #[test]
    fn test_build_request_uses_config_defaults() {
        let mut config = Config::default();
        config.search.sort = Some("price:asc".into());
        let request = build_request(&args(&["status:Sold"]), &config);

        assert_eq!(request.index, "ishraqa");
        assert_eq!(request.hits_per_page, 20);
        assert_eq!(request.page, 1);
        assert_eq!(request.resolved_sort(), "price:asc");
        assert_eq!(request.facet_filters.len(), 1);
    }

    #[test]
    fn test_render_table() {
        let request = SearchRequest::new("ishraqa").with_query("villa");
        let page = Envelope::from_value(json!({"success": true, "data": {
            "nbHits": 1,
            "hits": [{"id": "p-1", "name": "Villa Al Malqa",
                      "status": {"ar": "قيد الإنشاء", "en": "Under Construction"},
                      "district": {"ar": "الملقا"},
                      "lat": 24.7136, "lng": 46.6753}],
            "facetDistribution": {"district": {"الملقا": 1}}
        }}))
        .unwrap()
        .into_page(&request);

        let table = render_table(&page);
        assert!(table.starts_with("1 results for \"villa\" (page 1/1"));
        assert!(table.contains("Villa Al Malqa | قيد الإنشاء | الملقا | 0.0 كم من الرياض"));
        assert!(table.contains("district: الملقا (1)"));
    }
}
