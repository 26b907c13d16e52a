//! Orders sub-client — list, create, edit, delete, purchase.
//!
//! Mutations check the cached profile's role first. A caller who may not
//! perform the action gets [`AuthError::Forbidden`](crate::error::AuthError::Forbidden)
//! and no request is made.

use crate::auth::Profile;
use crate::client::FxMarketClient;
use crate::domain::transaction::wire::CreateTransactionBody;
use crate::error::SdkError;
use crate::shared::{ListQuery, Listing, OrderId, Page};

use super::view::{validate_purchase, OrderProjector};
use super::wire::CreateOrderBody;
use super::{NewOrder, Order, OrderUpdate};

use rust_decimal::Decimal;

pub struct Orders<'a> {
    pub(crate) client: &'a FxMarketClient,
}

impl<'a> Orders<'a> {
    /// One page of open orders, newest first unless `query` says otherwise.
    pub async fn list(&self, query: &ListQuery) -> Result<Page<Order>, SdkError> {
        let url = format!(
            "{}/orders?{}",
            self.client.http.api_url(),
            query.to_query_string()
        );
        self.client.http.get(&url).await
    }

    /// Place a sell order as the signed-in user. Verified sellers only.
    pub async fn create(&self, order: &NewOrder) -> Result<serde_json::Value, SdkError> {
        let seller = self
            .client
            .require_permission("create orders", Profile::can_create_orders)
            .await?
            .user_id;
        order.validate()?;
        let url = format!("{}/orders", self.client.http.api_url());
        let body = CreateOrderBody::new(order, seller);
        self.client.http.post(&url, &body).await
    }

    /// Edit one of the signed-in seller's own orders.
    pub async fn update(
        &self,
        order: &Order,
        update: &OrderUpdate,
    ) -> Result<serde_json::Value, SdkError> {
        self.client
            .require_permission("edit this order", |p| p.can_manage(order))
            .await?;
        update.validate()?;
        let url = format!("{}/orders/{}", self.client.http.api_url(), order.id);
        self.client.http.patch(&url, Some(update)).await
    }

    /// Withdraw one of the signed-in seller's own orders. Admins use
    /// [`Admin::delete_order`](crate::domain::admin::client::Admin::delete_order).
    pub async fn delete(&self, order: &Order) -> Result<(), SdkError> {
        self.client
            .require_permission("delete this order", |p| p.can_manage(order))
            .await?;
        self.delete_unchecked(order.id).await
    }

    pub(crate) async fn delete_unchecked(&self, id: OrderId) -> Result<(), SdkError> {
        let url = format!("{}/orders/{}", self.client.http.api_url(), id);
        let _: serde_json::Value = self.client.http.delete(&url).await?;
        Ok(())
    }

    /// Buy `amount` from `order` at the order's stored price.
    ///
    /// Verified buyers only. The amount is checked against the order's
    /// available amount before anything is sent; an invalid amount never
    /// reaches the server.
    pub async fn purchase(
        &self,
        order: &Order,
        amount: Decimal,
    ) -> Result<serde_json::Value, SdkError> {
        let buyer = self
            .client
            .require_permission("purchase", Profile::can_purchase)
            .await?
            .user_id;
        validate_purchase(order, amount)?;
        let url = format!("{}/transactions", self.client.http.api_url());
        let body = CreateTransactionBody::purchase(order, buyer, amount);

        tracing::debug!(order = %order.id, %amount, "submitting purchase");
        self.client.http.post(&url, &body).await
    }

    /// Projector for the signed-in user (anonymous if signed out) with the
    /// client's fee policy.
    pub async fn projector(&self) -> OrderProjector {
        let viewer = self.client.profile.read().await.as_ref().map(|p| p.user_id);
        OrderProjector::for_viewer(viewer).with_fee(self.client.fee_policy)
    }

    /// Refetch the listing's current page.
    pub async fn reload(&self, listing: &mut Listing<Order>) -> Result<(), SdkError> {
        let query = listing.query();
        let page = self.list(&query).await?;
        listing.apply(query.page, page);
        Ok(())
    }

    /// Refetch after a successful mutation. The mutation already succeeded,
    /// so a failed refetch is logged and leaves the listing as it was.
    pub async fn reload_best_effort(&self, listing: &mut Listing<Order>) -> bool {
        match self.reload(listing).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "order list refresh failed");
                false
            }
        }
    }
}
