//! Wire types for order requests.

use crate::shared::{serde_util, CurrencyPair, OperationType, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use super::NewOrder;

/// Body of `POST /api/orders`. The client stamps the operation type and the
/// seller; the user only chooses pair, amount and price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub currency_pair: CurrencyPair,
    #[serde(with = "serde_util::decimal")]
    pub amount: Decimal,
    #[serde(with = "serde_util::decimal")]
    pub price: Decimal,
    pub operation_type: OperationType,
    pub seller: UserId,
}

impl CreateOrderBody {
    pub fn new(order: &NewOrder, seller: UserId) -> Self {
        Self {
            currency_pair: order.currency_pair,
            amount: order.amount,
            price: order.price,
            operation_type: OperationType::Sell,
            seller,
        }
    }
}
