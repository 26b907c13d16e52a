//! Authentication — credentials, session continuity, user profile.
//!
//! ## Session Model
//!
//! - Login exchanges a username/password for an access + refresh token pair.
//!   Both are held by the [`session::Session`] owned by the HTTP client and
//!   written to its [`store::TokenStore`] under the keys `token` and
//!   `refreshToken`.
//! - Every outbound request carries `Authorization: Bearer <access token>`.
//! - The first `401` on a request triggers a single-flight refresh
//!   (`POST /api/auth/refresh`). Concurrent requests that are rejected while
//!   the refresh is running wait for it and replay with the new token.
//! - A failed refresh tears the session down and surfaces
//!   [`AuthError::SessionTerminated`](crate::error::AuthError::SessionTerminated).
//!
//! ## Session Hydration
//!
//! Use `client.auth().restore()` at startup to load persisted tokens and
//! validate them against `GET /api/auth/me`.

#[cfg(feature = "http")]
pub mod client;

#[cfg(feature = "http")]
pub mod session;

pub mod store;

use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::shared::UserId;

// ============================================================================
// User profile types
// ============================================================================

/// Marketplace role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The logged-in user, as returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    /// Unverified accounts can browse but not trade.
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Verified buyers may purchase against any order.
    pub fn can_purchase(&self) -> bool {
        self.role == Role::Buyer && self.verified
    }

    /// Verified sellers may list new orders.
    pub fn can_create_orders(&self) -> bool {
        self.role == Role::Seller && self.verified
    }

    /// Sellers may edit and delete their own orders.
    pub fn can_manage(&self, order: &Order) -> bool {
        self.role == Role::Seller && order.seller.id == self.user_id
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token pair returned by `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub phone: String,
}
