//! Who is logged in.
//!
//! The store is an explicit context object: clone it into whatever needs it.
//! All clones share one state and one in-flight refresh.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::api::PortalClient;
use crate::error::LoadError;
use crate::models::{ApiEnvelope, UserProfile};

/// Snapshot of the session as the UI sees it.
///
/// `user_data` is `None` both before the first load and after a failed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub user_data: Option<UserProfile>,
    pub user_data_loading: bool,
    /// Whether the backend runs in developer mode (enables developer login).
    pub developer_mode: bool,
}

type RefreshFuture = Shared<BoxFuture<'static, SessionState>>;

struct Inner {
    client: PortalClient,
    userinfo_endpoint: String,
    state: watch::Sender<SessionState>,
    in_flight: Mutex<Option<RefreshFuture>>,
}

/// Result of one userinfo round trip.
struct UserInfo {
    /// Present whenever the body parsed, regardless of `success`.
    developer_mode: Option<bool>,
    profile: Result<UserProfile, LoadError>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(client: PortalClient, userinfo_endpoint: impl Into<String>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        SessionStore {
            inner: Arc::new(Inner {
                client,
                userinfo_endpoint: userinfo_endpoint.into(),
                state,
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.state.borrow().logged_in
    }

    /// Ask the backend who we are and publish the answer.
    ///
    /// Calls made while a refresh is already running wait for that refresh
    /// instead of sending another request; all of them get the same state.
    pub async fn load_user_data(&self) -> SessionState {
        let refresh = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match in_flight.as_ref() {
                Some(refresh) => {
                    debug!("joining in-flight session refresh");
                    refresh.clone()
                }
                None => {
                    let refresh = self.spawn_refresh();
                    *in_flight = Some(refresh.clone());
                    refresh
                }
            }
        };
        refresh.await
    }

    /// Same as [`load_user_data`](Self::load_user_data).
    pub async fn refresh(&self) -> SessionState {
        self.load_user_data().await
    }

    /// Forget the current user locally. No request is sent.
    pub fn invalidate(&self) {
        self.inner.state.send_modify(|state| {
            state.logged_in = false;
            state.user_data = None;
        });
        info!("session invalidated");
    }

    /// Change the loaded user's first name locally, e.g. after a profile edit
    /// the backend already accepted. Returns false when no user is loaded.
    pub fn update_name(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.inner.state.send_if_modified(|state| match state.user_data.as_mut() {
            Some(profile) => {
                profile.first_name = name;
                true
            }
            None => false,
        })
    }

    /// Start a refresh as its own task so it completes, and clears
    /// `user_data_loading`, even if every caller stops waiting for it.
    fn spawn_refresh(&self) -> RefreshFuture {
        let task = tokio::spawn(
            self.clone()
                .run_refresh()
                .instrument(info_span!("session.refresh")),
        );
        let store = self.clone();
        async move {
            match task.await {
                Ok(state) => state,
                Err(e) => {
                    error!("session refresh task failed: {}", e);
                    store
                        .inner
                        .state
                        .send_modify(|state| state.user_data_loading = false);
                    store.clear_in_flight();
                    store.snapshot()
                }
            }
        }
        .boxed()
        .shared()
    }

    fn clear_in_flight(&self) {
        *self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    async fn run_refresh(self) -> SessionState {
        self.inner
            .state
            .send_modify(|state| state.user_data_loading = true);

        let user_info = self.request_user_info().await;
        match &user_info.profile {
            Ok(profile) => info!(
                event_name = "session.refresh.succeeded",
                event_domain = "session",
                username = profile.username.as_str(),
                "session refreshed"
            ),
            Err(LoadError::Api { message, .. }) => info!(
                event_name = "session.refresh.rejected",
                event_domain = "session",
                "not logged in: {}",
                message
            ),
            Err(e) => warn!(
                event_name = "session.refresh.failed",
                event_domain = "session",
                endpoint = self.inner.userinfo_endpoint.as_str(),
                "failed to load user info: {}",
                e
            ),
        }

        // Callers arriving from here on start a fresh request.
        self.clear_in_flight();
        self.inner.state.send_modify(|state| {
            if let Some(developer_mode) = user_info.developer_mode {
                state.developer_mode = developer_mode;
            }
            match user_info.profile {
                Ok(profile) => {
                    state.user_data = Some(profile);
                    state.logged_in = true;
                }
                Err(_) => {
                    state.user_data = None;
                    state.logged_in = false;
                }
            }
            state.user_data_loading = false;
        });

        self.snapshot()
    }

    async fn request_user_info(&self) -> UserInfo {
        let envelope = match self.fetch_envelope().await {
            Ok(envelope) => envelope,
            Err(e) => {
                return UserInfo {
                    developer_mode: None,
                    profile: Err(e),
                }
            }
        };

        let profile = if envelope.is_success() {
            envelope.data_as::<UserProfile>().and_then(|profile| {
                profile.ok_or_else(|| LoadError::Decode("response has no user profile".to_string()))
            })
        } else {
            Err(envelope.failure())
        };
        UserInfo {
            developer_mode: envelope.developer_mode,
            profile,
        }
    }

    async fn fetch_envelope(&self) -> Result<ApiEnvelope, LoadError> {
        let url = self
            .inner
            .client
            .resolve(&self.inner.userinfo_endpoint)
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let response = self
            .inner
            .client
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| LoadError::Transport(format!("error reading response body: {}", e)))?;
        ApiEnvelope::from_slice(&body)
    }
}
