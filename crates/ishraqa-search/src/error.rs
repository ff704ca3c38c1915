use reqwest::StatusCode;
use thiserror::Error;

/// Why a backend call produced no usable page.
///
/// Never surfaced by [`crate::SearchClient::search`], which collapses every
/// variant into an empty page; kept for logging and diagnostics.
#[derive(Debug, Error)]
pub enum SearchFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unparsable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid response envelope: {0}")]
    Envelope(&'static str),
}

impl SearchFailure {
    /// Short machine-friendly label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            SearchFailure::Transport(_) => "transport",
            SearchFailure::Status { .. } => "status",
            SearchFailure::Decode(_) => "decode",
            SearchFailure::Envelope(_) => "envelope",
        }
    }
}
