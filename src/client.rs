//! High-level client — `FxMarketClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, shared profile state, and accessor methods.

use crate::auth::client::Auth;
use crate::auth::session::Session;
use crate::auth::store::{MemoryTokenStore, TokenStore};
use crate::auth::Profile;
use crate::domain::admin::client::Admin;
use crate::domain::order::client::Orders;
use crate::domain::order::FeePolicy;
use crate::domain::transaction::client::Transactions;
use crate::error::{AuthError, SdkError};
use crate::http::{FxMarketHttp, RetryPolicy};

use async_lock::RwLock;
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::admin::client::Admin as AdminClient;
pub use crate::domain::order::client::Orders as OrdersClient;
pub use crate::domain::transaction::client::Transactions as TransactionsClient;

/// The primary entry point for the FxMarket SDK.
///
/// Provides nested sub-client accessors for each domain:
/// `client.auth()`, `client.orders()`, etc. Clones share the session and the
/// cached profile.
#[derive(Clone)]
pub struct FxMarketClient {
    pub(crate) http: FxMarketHttp,
    /// Profile of the signed-in user, from the last `/auth/me`.
    pub(crate) profile: Arc<RwLock<Option<Profile>>>,
    pub(crate) fee_policy: FeePolicy,
}

impl FxMarketClient {
    pub fn builder() -> FxMarketClientBuilder {
        FxMarketClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders { client: self }
    }

    pub fn transactions(&self) -> Transactions<'_> {
        Transactions { client: self }
    }

    pub fn admin(&self) -> Admin<'_> {
        Admin { client: self }
    }

    /// The session shared by every request made through this client.
    pub fn session(&self) -> &Arc<Session> {
        self.http.session()
    }

    pub fn fee_policy(&self) -> FeePolicy {
        self.fee_policy
    }

    // ── Guards ───────────────────────────────────────────────────────────

    pub(crate) async fn require_profile(&self) -> Result<Profile, SdkError> {
        self.profile
            .read()
            .await
            .clone()
            .ok_or_else(|| AuthError::NotAuthenticated.into())
    }

    /// The signed-in profile, if `allowed` accepts it. Refused locally with
    /// [`AuthError::Forbidden`] otherwise; nothing is sent.
    pub(crate) async fn require_permission(
        &self,
        action: &str,
        allowed: impl FnOnce(&Profile) -> bool,
    ) -> Result<Profile, SdkError> {
        let profile = self.require_profile().await?;
        if !allowed(&profile) {
            return Err(AuthError::Forbidden(format!(
                "{} ({}) may not {}",
                profile.username, profile.role, action
            ))
            .into());
        }
        Ok(profile)
    }

    pub(crate) async fn require_admin(&self) -> Result<Profile, SdkError> {
        self.require_permission("use the admin surface", Profile::is_admin)
            .await
    }
}

impl std::fmt::Debug for FxMarketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxMarketClient")
            .field("http", &self.http)
            .field("fee_policy", &self.fee_policy)
            .finish_non_exhaustive()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct FxMarketClientBuilder {
    base_url: String,
    api_prefix: String,
    request_timeout: Duration,
    refresh_timeout: Duration,
    fee_policy: FeePolicy,
    read_retry: RetryPolicy,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl Default for FxMarketClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            api_prefix: crate::network::API_PREFIX.to_string(),
            request_timeout: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(15),
            fee_policy: FeePolicy::default(),
            read_retry: RetryPolicy::None,
            token_store: None,
        }
    }
}

impl FxMarketClientBuilder {
    /// Backend origin, e.g. `http://localhost:3000`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Path prefix of every endpoint. Defaults to `/api`.
    pub fn api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.to_string();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// How long a session refresh may take before it counts as failed.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    pub fn fee_policy(mut self, fee_policy: FeePolicy) -> Self {
        self.fee_policy = fee_policy;
        self
    }

    /// Retry policy for GET requests. Writes are never retried.
    pub fn read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Where the session's tokens are persisted. Defaults to memory only.
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn build(self) -> Result<FxMarketClient, SdkError> {
        let store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let session = Arc::new(Session::new(store));

        let prefix = self.api_prefix.trim_matches('/');
        let origin = self.base_url.trim_end_matches('/');
        let api_url = if prefix.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{prefix}")
        };

        Ok(FxMarketClient {
            http: FxMarketHttp::new(
                &api_url,
                session,
                self.request_timeout,
                self.refresh_timeout,
                self.read_retry,
            )?,
            profile: Arc::new(RwLock::new(None)),
            fee_policy: self.fee_policy,
        })
    }
}
