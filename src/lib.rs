//! # FxMarket SDK
//!
//! A Rust client for the FxMarket peer-to-peer currency exchange: sellers list
//! USD/RUB and RUB/USD orders, buyers purchase against them, administrators
//! moderate users, orders and transactions.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core** — Shared types, domain records, pure order projection (no I/O)
//! 2. **Auth** — Profile and roles, token storage, the session lifecycle
//! 3. **HTTP API** — `FxMarketHttp` with transparent session refresh and opt-in retries
//! 4. **High-Level Client** — `FxMarketClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxmarket_sdk::prelude::*;
//!
//! let client = FxMarketClient::builder()
//!     .base_url("http://localhost:3000")
//!     .token_store(Arc::new(FileTokenStore::new("session.json")))
//!     .build()?;
//!
//! client.auth().login("ivan", "secret").await?;
//! let page = client.orders().list(&ListQuery::default()).await?;
//! let projector = client.orders().projector().await;
//! for view in projector.project_all(&page.data) {
//!     println!("{} {}", view.available_amount, view.display_price);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared ids, currency pairs, paging.
pub mod shared;

/// Domain modules (vertical slices): records, wire types, views, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Authentication: profile, token stores, session, login/logout.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with session refresh and retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `FxMarketClient` — the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared types
    pub use crate::shared::{
        CurrencyPair, ListQuery, Listing, OperationType, OrderId, Page, SortOrder, TransactionId,
        UserId, UserRef,
    };

    // Domain types — order
    pub use crate::domain::order::state::OrderBoard;
    pub use crate::domain::order::view::{project, validate_purchase};
    pub use crate::domain::order::{
        FeePolicy, NewOrder, Order, OrderEdit, OrderProjector, OrderStatus, OrderUpdate, OrderView,
    };

    // Domain types — transaction, admin
    pub use crate::domain::admin::{Dashboard, UserRecord, UserUpdate};
    pub use crate::domain::transaction::{Party, Transaction, TransactionStatus};

    // Errors
    pub use crate::error::{AuthError, HttpError, SdkError, ValidationError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Auth types
    pub use crate::auth::store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
    pub use crate::auth::{Profile, RegisterRequest, Role};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::auth::session::Session;
    #[cfg(feature = "http")]
    pub use crate::client::{
        AdminClient, AuthClient, FxMarketClient, FxMarketClientBuilder, OrdersClient,
        TransactionsClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};
}
