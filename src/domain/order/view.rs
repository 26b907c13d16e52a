//! Order view projection — what a given viewer sees for a raw order.
//!
//! Everything here is pure. The same functions drive table rows, the purchase
//! dialog's submit gate, the actual purchase call, and edit pre-fill, so a
//! user always edits and pays against the numbers they were shown.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Order, OrderUpdate};
use crate::error::ValidationError;
use crate::shared::{CurrencyPair, OperationType, OrderId, UserId};

// ─── FeePolicy ───────────────────────────────────────────────────────────────

/// Fixed platform fee folded into the stored price of sell orders.
///
/// The stored price already includes the fee; a seller looking at their own
/// order sees the rate they actually receive. For `USD/RUB` (selling dollars
/// for roubles) that is `price - offset`; for `RUB/USD` it is `price + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    pub offset: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            offset: Decimal::new(5, 1),
        }
    }
}

impl FeePolicy {
    pub fn new(offset: Decimal) -> Self {
        Self { offset }
    }

    /// No adjustment for anyone.
    pub fn none() -> Self {
        Self {
            offset: Decimal::ZERO,
        }
    }

    /// The price as the order's own seller sees it.
    pub fn seller_price(&self, order: &Order) -> Decimal {
        match (order.operation_type, order.currency_pair) {
            (OperationType::Sell, CurrencyPair::UsdRub) => order.price - self.offset,
            (OperationType::Sell, CurrencyPair::RubUsd) => order.price + self.offset,
            (OperationType::Buy, _) => order.price,
        }
    }
}

// ─── OrderView ───────────────────────────────────────────────────────────────

/// Display-ready fields for one order and one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub order_id: OrderId,
    pub available_amount: Decimal,
    pub display_price: Decimal,
    /// The viewer is the order's seller.
    pub own: bool,
}

/// Editable copy of an order, pre-filled with what the seller saw.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEdit {
    pub order_id: OrderId,
    pub currency_pair: CurrencyPair,
    /// Remaining capacity, not gross capacity.
    pub amount: Decimal,
    /// The seller-view price.
    pub price: Decimal,
}

impl OrderEdit {
    /// Body for `PATCH /api/orders/:id`. Submitting an unmodified edit sends
    /// back exactly the amount and price the seller was shown.
    pub fn to_update(&self) -> OrderUpdate {
        OrderUpdate {
            currency_pair: Some(self.currency_pair),
            amount: Some(self.amount),
            price: Some(self.price),
        }
    }
}

// ─── OrderProjector ──────────────────────────────────────────────────────────

/// Projects raw orders for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderProjector {
    viewer: Option<UserId>,
    fee: FeePolicy,
}

impl OrderProjector {
    /// `None` is an anonymous viewer, who never sees adjusted prices.
    pub fn for_viewer(viewer: Option<UserId>) -> Self {
        Self {
            viewer,
            fee: FeePolicy::default(),
        }
    }

    pub fn with_fee(mut self, fee: FeePolicy) -> Self {
        self.fee = fee;
        self
    }

    pub fn viewer(&self) -> Option<UserId> {
        self.viewer
    }

    pub fn is_own(&self, order: &Order) -> bool {
        self.viewer == Some(order.seller.id)
    }

    pub fn display_price(&self, order: &Order) -> Decimal {
        if self.is_own(order) {
            self.fee.seller_price(order)
        } else {
            order.price
        }
    }

    pub fn project(&self, order: &Order) -> OrderView {
        OrderView {
            order_id: order.id,
            available_amount: order.available_amount(),
            display_price: self.display_price(order),
            own: self.is_own(order),
        }
    }

    pub fn project_all<'a>(&self, orders: impl IntoIterator<Item = &'a Order>) -> Vec<OrderView> {
        orders.into_iter().map(|o| self.project(o)).collect()
    }

    /// Pre-fill the edit form. Editing is only offered to the order's seller,
    /// so the price is always the seller-view price.
    pub fn prefill_for_edit(&self, order: &Order) -> OrderEdit {
        OrderEdit {
            order_id: order.id,
            currency_pair: order.currency_pair,
            amount: order.available_amount(),
            price: self.fee.seller_price(order),
        }
    }
}

/// Project `order` for `viewer` with the default fee policy.
pub fn project(order: &Order, viewer: Option<UserId>) -> OrderView {
    OrderProjector::for_viewer(viewer).project(order)
}

/// Whether `amount` can be bought from `order` right now.
///
/// This is the only purchase check: the purchase dialog and
/// [`Orders::purchase`](super::client::Orders::purchase) both call it.
pub fn validate_purchase(order: &Order, amount: Decimal) -> Result<(), ValidationError> {
    let available = order.available_amount();
    if amount <= Decimal::ZERO || amount > available {
        return Err(ValidationError::InvalidAmount { amount, available });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::UserRef;
    use rust_decimal_macros::dec;

    const SELLER: u64 = 3;
    const BUYER: u64 = 4;

    fn order(pair: CurrencyPair, amount: Decimal, reserved: Option<Decimal>, price: Decimal) -> Order {
        Order {
            id: OrderId::new(1),
            currency_pair: pair,
            operation_type: OperationType::Sell,
            price,
            amount,
            reserved_amount: reserved,
            seller: UserRef {
                id: UserId::new(SELLER),
                username: "seller".into(),
            },
            status: None,
            created_at: None,
        }
    }

    fn scenario() -> Order {
        order(CurrencyPair::UsdRub, dec!(100), Some(dec!(30)), dec!(60))
    }

    fn seller() -> OrderProjector {
        OrderProjector::for_viewer(Some(UserId::new(SELLER)))
    }

    fn buyer() -> OrderProjector {
        OrderProjector::for_viewer(Some(UserId::new(BUYER)))
    }

    #[test]
    fn test_seller_sees_available_and_net_price() {
        let view = seller().project(&scenario());
        assert_eq!(view.available_amount, dec!(70));
        assert_eq!(view.display_price, dec!(59.5));
        assert!(view.own);
    }

    #[test]
    fn test_buyer_sees_raw_price() {
        let view = buyer().project(&scenario());
        assert_eq!(view.available_amount, dec!(70));
        assert_eq!(view.display_price, dec!(60));
        assert!(!view.own);
        assert_eq!(project(&scenario(), None).display_price, dec!(60));
    }

    #[test]
    fn test_rub_usd_seller_adjustment_adds_offset() {
        let o = order(CurrencyPair::RubUsd, dec!(5000), None, dec!(0.012));
        assert_eq!(seller().display_price(&o), dec!(0.512));
        assert_eq!(buyer().display_price(&o), dec!(0.012));
    }

    #[test]
    fn test_buy_orders_are_never_adjusted() {
        let mut o = scenario();
        o.operation_type = OperationType::Buy;
        assert_eq!(seller().display_price(&o), dec!(60));
    }

    #[test]
    fn test_custom_fee_policy() {
        let p = seller().with_fee(FeePolicy::new(dec!(1.25)));
        assert_eq!(p.display_price(&scenario()), dec!(58.75));
        let p = seller().with_fee(FeePolicy::none());
        assert_eq!(p.display_price(&scenario()), dec!(60));
    }

    #[test]
    fn test_purchase_bounds_scenario() {
        let o = scenario();
        assert!(validate_purchase(&o, dec!(70)).is_ok());
        assert!(validate_purchase(&o, dec!(0.01)).is_ok());
        assert_eq!(
            validate_purchase(&o, dec!(71)),
            Err(ValidationError::InvalidAmount {
                amount: dec!(71),
                available: dec!(70)
            })
        );
        assert!(validate_purchase(&o, dec!(0)).is_err());
        assert!(validate_purchase(&o, dec!(-5)).is_err());
    }

    #[test]
    fn test_purchase_bounds_across_samples() {
        let amounts = [dec!(1), dec!(10), dec!(100), dec!(2500.75)];
        let reservations = [None, Some(dec!(0)), Some(dec!(0.75)), Some(dec!(1))];
        for amount in amounts {
            for reserved in reservations {
                let o = order(CurrencyPair::UsdRub, amount, reserved, dec!(60));
                let available = amount - reserved.unwrap_or_default();
                assert_eq!(o.available_amount(), available);

                for candidate in [dec!(-1), dec!(0), dec!(0.01), available, available + dec!(0.01)] {
                    let accepted = candidate > dec!(0) && candidate <= available;
                    assert_eq!(
                        validate_purchase(&o, candidate).is_ok(),
                        accepted,
                        "amount={amount} reserved={reserved:?} candidate={candidate}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_fully_reserved_order_accepts_nothing() {
        let o = order(CurrencyPair::UsdRub, dec!(10), Some(dec!(10)), dec!(60));
        assert!(validate_purchase(&o, dec!(0.01)).is_err());
    }

    #[test]
    fn test_prefill_matches_what_seller_saw() {
        let o = scenario();
        let p = seller();
        let view = p.project(&o);
        let edit = p.prefill_for_edit(&o);
        assert_eq!(edit.amount, view.available_amount);
        assert_eq!(edit.price, view.display_price);

        let update = edit.to_update();
        assert_eq!(update.amount, Some(dec!(70)));
        assert_eq!(update.price, Some(dec!(59.5)));
        assert_eq!(update.currency_pair, Some(CurrencyPair::UsdRub));
    }

    #[test]
    fn test_project_all_keeps_order() {
        let mut other = scenario();
        other.id = OrderId::new(2);
        other.seller.id = UserId::new(BUYER);
        let views = seller().project_all([&scenario(), &other]);
        assert_eq!(views.len(), 2);
        assert!(views[0].own);
        assert!(!views[1].own);
        assert_eq!(views[1].display_price, dec!(60));
    }
}
