pub mod client;
pub mod config;
pub mod debounce;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod listing;
pub mod live;
pub mod map;
pub mod request;
pub mod resolve;
pub mod types;

pub use client::{HttpSearchClient, SearchClient};
pub use config::ClientConfig;
pub use debounce::Debouncer;
pub use envelope::Envelope;
pub use error::SearchFailure;
pub use filter::{build_filter_expression, FacetFilter};
pub use listing::{distance_km, ProjectStatus, RIYADH};
pub use live::{LiveEvent, LiveSearch, DEFAULT_DEBOUNCE};
pub use map::{markers, GeoBounds, MapMarker};
pub use request::SearchRequest;
pub use types::{FacetDistribution, Geo, Highlight, Hit, ResultPage};

/// Initialize structured JSON logging.
///
/// `RUST_LOG` wins when set; otherwise `debug` turns on request/response
/// tracing.
pub fn init_logging(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    fmt().json().with_env_filter(filter).init();
}
