//! Session state — tokens, durable mirror, and the in-flight refresh slot.
//!
//! The HTTP client owns one `Session` and consults it on every request. The
//! refresh itself is driven by [`FxMarketHttp`](crate::http::FxMarketHttp);
//! this type only decides *whether* a rejected request should start a
//! refresh, join the one already running, or replay immediately.
//!
//! An in-flight refresh is a boxed future wrapped in [`Shared`]: every request
//! rejected while it runs awaits a clone, so all of them settle with the same
//! outcome, exactly once, and at most one refresh call is ever outbound.

use async_lock::Mutex;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;

use crate::auth::store::{StoredTokens, TokenStore};
use crate::error::SdkError;

/// Outcome of a refresh: the new access token, or why the session ended.
pub(crate) type RefreshOutcome = Result<String, String>;

/// A refresh every rejected request can await.
pub(crate) type RefreshFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// What a request rejected with `401` should do next.
pub(crate) enum Renewal {
    /// The token was already renewed after the request went out; replay with it.
    Ready(String),
    /// Await this refresh, then replay.
    Pending(RefreshFlight),
    /// No refresh token is held; the rejection stands.
    NoSession,
}

#[derive(Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    in_flight: Option<RefreshFlight>,
    /// Bumped on every login and teardown so a refresh started for an older
    /// session cannot write into a newer one.
    epoch: u64,
}

/// Access/refresh token pair plus single-flight refresh coordination.
pub struct Session {
    state: Mutex<SessionState>,
    /// Orders token-store writes. Taken before `state` is released so writes
    /// land in the order the state changed; the write itself runs after.
    io: Mutex<()>,
    store: Arc<dyn TokenStore>,
}

/// A token-store write decided under the state lock.
enum StoreWrite {
    Save(StoredTokens),
    Clear,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            io: Mutex::new(()),
            store,
        }
    }

    /// Start a session from a fresh login.
    pub async fn init(&self, access_token: String, refresh_token: String) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.in_flight = None;
        state.access_token = Some(access_token.clone());
        state.refresh_token = Some(refresh_token.clone());
        let io = self.io.lock().await;
        drop(state);

        self.write(StoreWrite::Save(StoredTokens {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        }));
        drop(io);
        tracing::info!("session started");
    }

    /// Load tokens persisted by a previous run. Returns `true` if any were found.
    pub async fn restore(&self) -> Result<bool, SdkError> {
        let stored = {
            let _io = self.io.lock().await;
            self.store.load()?
        };
        if stored.is_empty() {
            return Ok(false);
        }
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.in_flight = None;
        state.access_token = stored.access_token;
        state.refresh_token = stored.refresh_token;
        tracing::debug!("session restored from token store");
        Ok(true)
    }

    /// End the session: forget both tokens in memory and in the store.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        Self::reset(&mut state);
        let io = self.io.lock().await;
        drop(state);

        self.write(StoreWrite::Clear);
        drop(io);
        tracing::info!("session ended");
    }

    /// Current access token, if logged in.
    pub async fn access_token(&self) -> Option<String> {
        self.state.lock().await.access_token.clone()
    }

    /// Whether a refresh token is held, i.e. the session can still be renewed.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.refresh_token.is_some()
    }

    /// Whether a refresh is currently outbound.
    pub async fn is_refreshing(&self) -> bool {
        self.state.lock().await.in_flight.is_some()
    }

    /// Decide how a request rejected while carrying `rejected` proceeds.
    ///
    /// `start` builds the refresh future from the stored refresh token and the
    /// session epoch. It is only called when no refresh is in flight, and the
    /// returned future is not polled until a caller awaits it.
    pub(crate) async fn renewal<F>(&self, rejected: Option<&str>, start: F) -> Renewal
    where
        F: FnOnce(String, u64) -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut state = self.state.lock().await;

        if let Some(flight) = &state.in_flight {
            return Renewal::Pending(flight.clone());
        }

        if let Some(current) = &state.access_token {
            if rejected != Some(current.as_str()) {
                return Renewal::Ready(current.clone());
            }
        }

        let Some(refresh_token) = state.refresh_token.clone() else {
            return Renewal::NoSession;
        };

        let flight = start(refresh_token, state.epoch).shared();
        state.in_flight = Some(flight.clone());
        Renewal::Pending(flight)
    }

    /// Record a refreshed access token and release the in-flight slot.
    ///
    /// Returns `false` (and changes nothing) if the session was replaced or
    /// torn down after the refresh started.
    pub(crate) async fn install_access_token(&self, epoch: u64, access_token: String) -> bool {
        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return false;
        }
        let tokens = StoredTokens {
            access_token: Some(access_token.clone()),
            refresh_token: state.refresh_token.clone(),
        };
        state.access_token = Some(access_token);
        state.in_flight = None;
        let io = self.io.lock().await;
        drop(state);

        self.write(StoreWrite::Save(tokens));
        drop(io);
        true
    }

    /// Tear down after a failed refresh, unless the session already changed.
    pub(crate) async fn terminate(&self, epoch: u64) {
        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            return;
        }
        Self::reset(&mut state);
        let io = self.io.lock().await;
        drop(state);

        self.write(StoreWrite::Clear);
        drop(io);
        tracing::info!("session terminated after failed refresh");
    }

    fn reset(state: &mut SessionState) {
        state.epoch += 1;
        state.access_token = None;
        state.refresh_token = None;
        state.in_flight = None;
    }

    /// Runs with `io` held and `state` released.
    fn write(&self, write: StoreWrite) {
        // In-memory tokens stay authoritative if the store is unavailable.
        match write {
            StoreWrite::Save(tokens) => {
                if let Err(e) = self.store.save(&tokens) {
                    tracing::warn!(error = %e, "failed to persist session tokens");
                }
            }
            StoreWrite::Clear => {
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear token store");
                }
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
