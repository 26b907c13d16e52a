//! Wire types for transaction requests.

use crate::domain::order::Order;
use crate::shared::{serde_util, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::TransactionStatus;

/// Body of `POST /api/transactions`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionBody {
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub order_id: OrderId,
    #[serde(with = "serde_util::decimal")]
    pub amount: Decimal,
    #[serde(with = "serde_util::decimal")]
    pub exchange_rate: Decimal,
    pub status: TransactionStatus,
    pub scheduled_time: DateTime<Utc>,
}

impl CreateTransactionBody {
    /// A pending purchase of `amount` from `order` at its stored price.
    pub fn purchase(order: &Order, buyer: UserId, amount: Decimal) -> Self {
        Self {
            buyer_id: buyer,
            seller_id: order.seller.id,
            order_id: order.id,
            amount,
            exchange_rate: order.price,
            status: TransactionStatus::Pending,
            scheduled_time: Utc::now(),
        }
    }
}
