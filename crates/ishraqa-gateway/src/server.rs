use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::rejection::JsonRejection;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ishraqa_search::{LiveSearch, ResultPage, SearchClient, SearchRequest, DEFAULT_DEBOUNCE};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::rate_limiter::{rate_limit_middleware, RateLimiter};
use crate::types::*;

/// Template and debounce for live search sockets
#[derive(Clone)]
pub struct SessionDefaults {
    pub template: SearchRequest,
    pub debounce: Duration,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            template: SearchRequest::default(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn SearchClient>,
    pub rate_limiter: Arc<RateLimiter>,
    pub allowed_origins: Vec<String>,
    pub defaults: SessionDefaults,
}

/// Create the Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = if state.allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .allowed_origins
            .iter()
            .filter_map(|s| match s.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    warn!(origin = %s, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let rate_limiter = state.rate_limiter.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/search", post(search))
        .route("/ws/search", get(ws_upgrade))
        .layer(middleware::from_fn(
            move |addr: axum::extract::ConnectInfo<SocketAddr>, req, next| {
                let rl = rate_limiter.clone();
                async move { rate_limit_middleware(addr, rl, req, next).await }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Start the gateway server
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });

    let router = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!(addr = %addr, "Starting gateway server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Gateway server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- REST Handlers ---

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

const MAX_QUERY_LENGTH: usize = 1_000;

async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ResultPage>, (StatusCode, Json<ErrorResponse>)> {
    let Json(req) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: rejection.body_text(),
            }),
        )
    })?;

    if req.query.len() > MAX_QUERY_LENGTH {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse {
                error: format!(
                    "Query exceeds maximum length of {} bytes",
                    MAX_QUERY_LENGTH
                ),
            }),
        ));
    }

    // Backend failures already come back as an empty page; an error here
    // means the request itself is malformed.
    match state.client.search(&req).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

// --- WebSocket Handler ---

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

const WS_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

async fn handle_ws_connection(socket: WebSocket, state: AppState) {
    use futures_util::{SinkExt, StreamExt};
    use tokio::time::timeout;

    let (mut live, mut events) = LiveSearch::new(
        state.client.clone(),
        state.defaults.template.clone(),
        state.defaults.debounce,
    );
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Forward fresh results to the client
    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let event = ServerEvent::from(event);
            if let Ok(json) = serde_json::to_string(&event) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    loop {
        match timeout(WS_IDLE_TIMEOUT, ws_receiver.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                if text.as_str().len() > MAX_QUERY_LENGTH * 4 {
                    info!("WebSocket message exceeds max length, ignoring");
                    continue;
                }
                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(ClientMessage::Input { query }) => live.input(&query),
                    Ok(ClientMessage::Submit { query }) => live.submit(&query),
                    Ok(ClientMessage::Refine { facet_filters }) => live.refine(facet_filters),
                    Ok(ClientMessage::Page { page }) => live.go_to_page(page),
                    Err(e) => info!(error = %e, "Ignoring malformed WebSocket message"),
                }
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(_))) => {
                info!("WebSocket error, closing connection");
                break;
            }
            Ok(None) => {
                info!("WebSocket connection closed by client");
                break;
            }
            Err(_) => {
                info!(
                    "WebSocket idle timeout ({}s), closing connection",
                    WS_IDLE_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }

    drop(live);
    send_task.abort();
}
