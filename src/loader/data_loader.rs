use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, debug_span, info, warn, Instrument};

use super::options::FetchOptions;
use super::state::LoaderState;
use crate::api::PortalClient;
use crate::error::LoadError;
use crate::models::ApiEnvelope;
use crate::utils::log_throttle::LogThrottle;

const FAILURE_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Loads one Portal API endpoint and publishes `{loading, loaded, error, data}`.
///
/// Each `fetch` takes a new generation number. When it completes, its result
/// is applied only if no newer `fetch` has started in the meantime; a stale
/// completion leaves the state alone and returns [`LoadError::Superseded`].
pub struct PortalApiDataLoader<T> {
    client: PortalClient,
    endpoint: String,
    method: Method,
    state: watch::Sender<LoaderState<T>>,
    generation: AtomicU64,
    failure_log: LogThrottle,
}

impl<T> PortalApiDataLoader<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// A `GET` loader for `endpoint`.
    pub fn new(client: PortalClient, endpoint: impl Into<String>) -> Self {
        Self::with_method(client, endpoint, Method::GET)
    }

    pub fn with_method(client: PortalClient, endpoint: impl Into<String>, method: Method) -> Self {
        let (state, _) = watch::channel(LoaderState::default());
        PortalApiDataLoader {
            client,
            endpoint: endpoint.into(),
            method,
            state,
            generation: AtomicU64::new(0),
            failure_log: LogThrottle::new(FAILURE_LOG_WINDOW),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// A copy of the current state.
    pub fn state(&self) -> LoaderState<T> {
        self.state.borrow().clone()
    }

    /// Receive every state transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<LoaderState<T>> {
        self.state.subscribe()
    }

    /// Issue one request and publish its outcome.
    ///
    /// `loading` is set before the request is sent and cleared together with
    /// the result, in a single state update.
    ///
    /// Dropping the returned future before it completes (a timeout, an
    /// aborted task) cancels the request and clears `loading` for it.
    pub async fn fetch(&self, options: FetchOptions) -> Result<Option<T>, LoadError> {
        let span = debug_span!(
            "loader.fetch",
            endpoint = self.endpoint.as_str(),
            method = self.method.as_str()
        );
        async move {
            let mut pending = PendingFetch {
                loader: self,
                generation: self.begin(),
                settled: false,
            };
            let outcome = self.send(options).await;
            pending.settled = true;
            self.finish(pending.generation, outcome)
        }
        .instrument(span)
        .await
    }

    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        debug!(
            endpoint = self.endpoint.as_str(),
            method = self.method.as_str(),
            generation,
            "loader request started"
        );
        generation
    }

    async fn send(&self, options: FetchOptions) -> Result<Option<T>, LoadError> {
        let url = self
            .client
            .resolve(&self.endpoint)
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let request = options.apply(self.client.http().request(self.method.clone(), url));

        let response = request
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::Transport(format!("error reading response body: {}", e)))?;
        debug!(
            endpoint = self.endpoint.as_str(),
            status = status.as_u16(),
            bytes = body.len(),
            "loader response received"
        );

        // The envelope decides success, not the HTTP status.
        ApiEnvelope::from_slice(&body)?.into_result()
    }

    fn finish(
        &self,
        generation: u64,
        outcome: Result<Option<T>, LoadError>,
    ) -> Result<Option<T>, LoadError> {
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match &outcome {
                Ok(data) => {
                    state.data = data.clone();
                    state.loaded = true;
                    state.error = None;
                }
                Err(e) => state.error = Some(e.to_string()),
            }
            state.loading = false;
            true
        });

        if !applied {
            info!(
                event_name = "loader.fetch.superseded",
                event_domain = "loader",
                endpoint = self.endpoint.as_str(),
                generation,
                "discarding completion of a superseded request"
            );
            return Err(LoadError::Superseded);
        }

        match &outcome {
            Ok(_) => self.failure_log.reset(),
            Err(e) => {
                if let Some(suppressed_count) = self.failure_log.should_emit() {
                    warn!(
                        event_name = "loader.fetch.failed",
                        event_domain = "loader",
                        endpoint = self.endpoint.as_str(),
                        method = self.method.as_str(),
                        suppressed_count,
                        "portal request failed: {}",
                        e
                    );
                }
            }
        }
        outcome
    }
}

/// Clears `loading` when a fetch is dropped before it settles. A newer
/// fetch owns the state by then and is left alone.
struct PendingFetch<'a, T> {
    loader: &'a PortalApiDataLoader<T>,
    generation: u64,
    settled: bool,
}

impl<T> Drop for PendingFetch<'_, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let generation = self.generation;
        let current = &self.loader.generation;
        let cleared = self.loader.state.send_if_modified(|state| {
            if current.load(Ordering::SeqCst) != generation || !state.loading {
                return false;
            }
            state.loading = false;
            true
        });
        if cleared {
            debug!(
                endpoint = self.loader.endpoint.as_str(),
                generation, "loader request dropped before completion"
            );
        }
    }
}
