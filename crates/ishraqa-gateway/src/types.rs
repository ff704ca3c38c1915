use ishraqa_search::{FacetFilter, LiveEvent, ResultPage};
use serde::{Deserialize, Serialize};

/// WebSocket client message
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Search box keystroke (debounced)
    Input { query: String },
    /// Explicit submit (immediate)
    Submit { query: String },
    Refine {
        #[serde(default, rename = "facetFilters")]
        facet_filters: Vec<FacetFilter>,
    },
    Page { page: usize },
}

/// WebSocket server event
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Results { generation: u64, page: ResultPage },
    Error { generation: u64, message: String },
}

impl From<LiveEvent> for ServerEvent {
    fn from(event: LiveEvent) -> Self {
        match event {
            LiveEvent::Results { generation, page } => ServerEvent::Results { generation, page },
            LiveEvent::Failed {
                generation,
                message,
            } => ServerEvent::Error {
                generation,
                message,
            },
        }
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"input","query":"فيلا"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Input { ref query } if query == "فيلا"));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"refine","facetFilters":[["district:X","district:Y"],"status:Sold"]}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::Refine { facet_filters } => assert_eq!(facet_filters.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        // Same field name as the REST search body
        let body: ishraqa_search::SearchRequest =
            serde_json::from_str(r#"{"facetFilters":["status:Sold"]}"#).unwrap();
        assert_eq!(body.facet_filters.len(), 1);

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"page","page":2}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Page { page: 2 }));
    }

    #[test]
    fn test_server_event_from_live_failure() {
        let event = ServerEvent::from(LiveEvent::Failed {
            generation: 4,
            message: "bad".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["generation"], 4);
    }
}
