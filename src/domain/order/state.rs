//! Order listing state — app-owned, SDK-provided update logic.

use super::view::{OrderProjector, OrderView};
use super::Order;
use crate::shared::{Listing, OrderId};

/// The marketplace order table: the current page of orders plus its query.
///
/// The app owns instances of this type, fills it through
/// [`Orders::reload`](super::client::Orders::reload), and projects rows for
/// the signed-in viewer on render.
pub type OrderBoard = Listing<Order>;

impl Listing<Order> {
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.items().iter().find(|o| o.id == id)
    }

    /// Replace an order in place, e.g. after a successful edit.
    pub fn upsert(&mut self, order: Order) -> bool {
        let id = order.id;
        self.replace_where(|o| o.id == id, order)
    }

    /// Drop an order from the current page, e.g. after a delete.
    pub fn remove(&mut self, id: OrderId) -> bool {
        self.remove_where(|o| o.id == id) > 0
    }

    /// Rows as `projector`'s viewer sees them, in table order.
    pub fn views(&self, projector: &OrderProjector) -> Vec<OrderView> {
        projector.project_all(self.items())
    }
}
