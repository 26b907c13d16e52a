//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the backend sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod listing;
pub mod serde_util;

pub use listing::Listing;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Backend user identifier.
    UserId
);
numeric_id!(
    /// Backend order identifier.
    OrderId
);
numeric_id!(
    /// Backend transaction identifier.
    TransactionId
);

// ─── UserRef ─────────────────────────────────────────────────────────────────

/// A user reference embedded in orders and transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
}

// ─── CurrencyPair ────────────────────────────────────────────────────────────

/// A directional currency pair. `USD/RUB` and `RUB/USD` are distinct markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyPair {
    #[serde(rename = "USD/RUB")]
    UsdRub,
    #[serde(rename = "RUB/USD")]
    RubUsd,
}

impl CurrencyPair {
    pub const ALL: [CurrencyPair; 2] = [CurrencyPair::UsdRub, CurrencyPair::RubUsd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsdRub => "USD/RUB",
            Self::RubUsd => "RUB/USD",
        }
    }

    /// The currency being sold.
    pub fn base(&self) -> &'static str {
        match self {
            Self::UsdRub => "USD",
            Self::RubUsd => "RUB",
        }
    }

    /// The currency the rate is quoted in.
    pub fn quote(&self) -> &'static str {
        match self {
            Self::UsdRub => "RUB",
            Self::RubUsd => "USD",
        }
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyPair {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD/RUB" => Ok(Self::UsdRub),
            "RUB/USD" => Ok(Self::RubUsd),
            other => Err(format!("Unknown currency pair: {}", other)),
        }
    }
}

// ─── OperationType ───────────────────────────────────────────────────────────

/// Order direction from the creator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    #[default]
    Sell,
    Buy,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sell => "sell",
            Self::Buy => "buy",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// One page of a paginated backend listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Page, limit and sort parameters for listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: None,
            sort_order: SortOrder::Desc,
        }
    }
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort_field = Some(field.to_string());
        self.sort_order = order;
        self
    }

    /// Render as a query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut params = vec![
            format!("page={}", self.page),
            format!("limit={}", self.limit),
        ];
        if let Some(field) = &self.sort_field {
            params.push(format!("sortField={}", urlencoding::encode(field)));
        }
        params.push(format!("sortOrder={}", self.sort_order.as_str()));
        params.join("&")
    }
}
