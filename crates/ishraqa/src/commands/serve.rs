use anyhow::Result;
use ishraqa_gateway::{start_server, AppState, RateLimiter, SessionDefaults};
use ishraqa_search::{HttpSearchClient, SearchRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;

pub async fn execute(host: Option<String>, port: Option<u16>, config: &Config) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);
    info!(host = %host, port, backend = %config.backend.base_url, "Starting gateway server");

    let client = Arc::new(HttpSearchClient::new(config.backend.clone())?);

    let mut template = SearchRequest::new(&config.search.index)
        .with_hits_per_page(config.search.hits_per_page);
    if let Some(sort) = &config.search.sort {
        template = template.with_sort(sort);
    }
    template.validate()?;

    let state = AppState {
        client,
        rate_limiter: Arc::new(RateLimiter::new(config.gateway.rate_limit_per_minute)),
        allowed_origins: config.gateway.allowed_origins.clone(),
        defaults: SessionDefaults {
            template,
            debounce: Duration::from_millis(config.search.debounce_ms),
        },
    };

    start_server(state, &host, port).await?;

    Ok(())
}
