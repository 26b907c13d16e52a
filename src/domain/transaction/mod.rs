//! Transaction domain — purchase records and their cancellation rule.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::error::ValidationError;
use crate::shared::{serde_util, CurrencyPair, OrderId, TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── TransactionStatus ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Transaction ─────────────────────────────────────────────────────────────

/// A buyer or seller as embedded in a transaction row. Listings may carry
/// only the username.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: String,
}

/// The order a transaction was made against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    #[serde(default)]
    pub currency_pair: Option<CurrencyPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(with = "serde_util::decimal")]
    pub amount: Decimal,
    /// The order's stored price at purchase time.
    #[serde(default, with = "serde_util::decimal_opt")]
    pub exchange_rate: Option<Decimal>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub buyer: Option<Party>,
    #[serde(default)]
    pub seller: Option<Party>,
    #[serde(default)]
    pub order: Option<OrderSummary>,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Only pending transactions can be cancelled.
    pub fn is_cancellable(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn ensure_cancellable(&self) -> Result<(), ValidationError> {
        if self.is_cancellable() {
            Ok(())
        } else {
            Err(ValidationError::NotCancellable {
                status: self.status.to_string(),
            })
        }
    }

    /// `amount * exchangeRate`, when the rate is known.
    pub fn total(&self) -> Option<Decimal> {
        self.exchange_rate.map(|rate| self.amount * rate)
    }
}
