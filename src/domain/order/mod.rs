//! Order domain — order records, view projection, listing state.

#[cfg(feature = "http")]
pub mod client;
pub mod state;
pub mod view;
pub mod wire;

use crate::error::ValidationError;
use crate::shared::{serde_util, CurrencyPair, OperationType, OrderId, UserRef};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use view::{FeePolicy, OrderEdit, OrderProjector, OrderView};

// ─── OrderStatus ─────────────────────────────────────────────────────────────

/// Lifecycle state, owned by the backend. The client never transitions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Closed,
    #[serde(other)]
    Unknown,
}

// ─── Order ───────────────────────────────────────────────────────────────────

/// A seller's standing offer, as returned by `GET /api/orders`.
///
/// `price` is the stored rate, before any viewer-specific adjustment; use an
/// [`OrderProjector`] to get what a given viewer should see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub currency_pair: CurrencyPair,
    #[serde(default)]
    pub operation_type: OperationType,
    #[serde(with = "serde_util::decimal")]
    pub price: Decimal,
    #[serde(with = "serde_util::decimal")]
    pub amount: Decimal,
    /// Quantity committed to pending transactions. Older rows omit it.
    #[serde(default, with = "serde_util::decimal_opt")]
    pub reserved_amount: Option<Decimal>,
    pub seller: UserRef,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// `amount - reservedAmount`, with a missing reservation counted as zero.
    ///
    /// Not clamped: a negative result means the row violates the backend's
    /// `reserved <= amount` invariant and is surfaced as-is.
    pub fn available_amount(&self) -> Decimal {
        self.amount - self.reserved_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, None | Some(OrderStatus::Open))
    }
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// A new sell order, as entered by the seller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub currency_pair: CurrencyPair,
    pub amount: Decimal,
    pub price: Decimal,
}

impl NewOrder {
    pub fn new(currency_pair: CurrencyPair, amount: Decimal, price: Decimal) -> Self {
        Self {
            currency_pair,
            amount,
            price,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount {
                amount: self.amount,
                available: self.amount.max(Decimal::ZERO),
            });
        }
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

/// Partial update for `PATCH /api/orders/:id`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_pair: Option<CurrencyPair>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_util::decimal_opt"
    )]
    pub amount: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_util::decimal_opt"
    )]
    pub price: Option<Decimal>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        self.currency_pair.is_none() && self.amount.is_none() && self.price.is_none()
    }

    /// A remaining amount of zero is allowed (it closes the order out);
    /// negative amounts and non-positive prices are not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(amount) = self.amount {
            if amount < Decimal::ZERO {
                return Err(ValidationError::InvalidAmount {
                    amount,
                    available: Decimal::ZERO,
                });
            }
        }
        if let Some(price) = self.price {
            if price <= Decimal::ZERO {
                return Err(ValidationError::InvalidPrice(price));
            }
        }
        Ok(())
    }
}
