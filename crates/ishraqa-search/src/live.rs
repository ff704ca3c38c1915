use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::client::SearchClient;
use crate::debounce::Debouncer;
use crate::filter::FacetFilter;
use crate::request::SearchRequest;
use crate::types::ResultPage;

/// Keystroke debounce used by the storefront search box
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Outcome of one fired search, tagged with its generation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    Results { generation: u64, page: ResultPage },
    Failed { generation: u64, message: String },
}

impl LiveEvent {
    pub fn generation(&self) -> u64 {
        match self {
            LiveEvent::Results { generation, .. } | LiveEvent::Failed { generation, .. } => {
                *generation
            }
        }
    }
}

/// Caller-side search session: debounced input, "most recent call wins".
///
/// Every call takes the next generation number at the moment it fires. A
/// finished call is delivered only if no newer call has fired since and no
/// newer result was delivered before it; older responses are dropped.
/// In-flight calls are never cancelled.
pub struct LiveSearch {
    client: Arc<dyn SearchClient>,
    request: SearchRequest,
    latest: Arc<AtomicU64>,
    delivered: Arc<Mutex<u64>>,
    debouncer: Debouncer,
    events: mpsc::Sender<LiveEvent>,
}

impl LiveSearch {
    pub fn new(
        client: Arc<dyn SearchClient>,
        template: SearchRequest,
        delay: Duration,
    ) -> (Self, mpsc::Receiver<LiveEvent>) {
        let (events, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let session = Self {
            client,
            request: template,
            latest: Arc::new(AtomicU64::new(0)),
            delivered: Arc::new(Mutex::new(0)),
            debouncer: Debouncer::new(delay),
            events,
        };
        (session, rx)
    }

    /// Request the next search will use
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Generation of the most recently fired call (0 before the first)
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Search box keystroke. Empty input fires immediately.
    pub fn input(&mut self, query: &str) {
        self.request.query = query.to_string();
        self.request.page = 0;
        if query.is_empty() {
            self.fire();
            return;
        }

        // The timer only fires if nothing else fired while it was waiting.
        let call = self.prepare();
        let seen = self.latest_generation();
        self.debouncer.schedule(move || {
            let search = call.fire_if_current(seen);
            async move {
                if let Some(search) = search {
                    search.await;
                }
            }
        });
    }

    /// Explicit submit: fire now with `query`.
    pub fn submit(&mut self, query: &str) {
        self.request.query = query.to_string();
        self.request.page = 0;
        self.fire();
    }

    /// Replace the facet refinements and search again right away.
    pub fn refine(&mut self, facet_filters: Vec<FacetFilter>) {
        self.request.facet_filters = facet_filters;
        self.request.page = 0;
        self.fire();
    }

    /// Jump to another page of the current query.
    pub fn go_to_page(&mut self, page: usize) {
        self.request.page = page;
        self.fire();
    }

    fn fire(&mut self) {
        self.debouncer.cancel();
        let search = self.prepare().fire();
        self.debouncer.fire_now(search);
    }

    fn prepare(&self) -> PendingCall {
        PendingCall {
            client: self.client.clone(),
            request: self.request.clone(),
            latest: self.latest.clone(),
            delivered: self.delivered.clone(),
            events: self.events.clone(),
        }
    }
}

/// A search snapshot that has not taken its generation yet
struct PendingCall {
    client: Arc<dyn SearchClient>,
    request: SearchRequest,
    latest: Arc<AtomicU64>,
    delivered: Arc<Mutex<u64>>,
    events: mpsc::Sender<LiveEvent>,
}

impl PendingCall {
    /// Take the next generation now and return the search to run.
    fn fire(self) -> impl Future<Output = ()> + Send + 'static {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.run(generation)
    }

    /// Like `fire`, but only if the latest generation is still `seen`.
    fn fire_if_current(self, seen: u64) -> Option<impl Future<Output = ()> + Send + 'static> {
        match self
            .latest
            .compare_exchange(seen, seen + 1, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => Some(self.run(seen + 1)),
            Err(current) => {
                debug!(seen, latest = current, "Debounced search superseded before firing");
                None
            }
        }
    }

    async fn run(self, generation: u64) {
        debug!(generation, query = %self.request.query, "Firing live search");

        let event = match self.client.search(&self.request).await {
            Ok(page) => LiveEvent::Results { generation, page },
            Err(e) => {
                error!(generation, error = %e, "Live search rejected request");
                LiveEvent::Failed {
                    generation,
                    message: e.to_string(),
                }
            }
        };

        if self.is_stale(generation) {
            return;
        }
        let Ok(permit) = self.events.reserve().await else {
            return;
        };

        // Check and enqueue together so deliveries stay in generation order.
        let mut delivered = self.delivered.lock().unwrap_or_else(|e| e.into_inner());
        if self.is_stale(generation) || *delivered > generation {
            return;
        }
        *delivered = generation;
        permit.send(event);
    }

    fn is_stale(&self, generation: u64) -> bool {
        let latest = self.latest.load(Ordering::SeqCst);
        if latest != generation {
            debug!(generation, latest, "Discarding stale results");
            return true;
        }
        false
    }
}
