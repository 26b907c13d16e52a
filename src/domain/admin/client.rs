//! Admin sub-client — user moderation and forced deletes.
//!
//! Every call checks the cached profile first; non-admins get
//! [`AuthError::Forbidden`](crate::error::AuthError::Forbidden) without a
//! request being made.

use crate::client::FxMarketClient;
use crate::domain::admin::{Dashboard, UserRecord, UserUpdate};
use crate::error::SdkError;
use crate::shared::{ListQuery, OrderId, TransactionId, UserId};

use futures_util::future::try_join3;

/// Sub-client for admin operations.
pub struct Admin<'a> {
    pub(crate) client: &'a FxMarketClient,
}

impl<'a> Admin<'a> {
    pub async fn users(&self) -> Result<Vec<UserRecord>, SdkError> {
        self.client.require_admin().await?;
        let url = format!("{}/users", self.client.http.api_url());
        self.client.http.get(&url).await
    }

    pub async fn user(&self, id: UserId) -> Result<UserRecord, SdkError> {
        self.client.require_admin().await?;
        let url = format!("{}/users/{}", self.client.http.api_url(), id);
        self.client.http.get(&url).await
    }

    pub async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<serde_json::Value, SdkError> {
        self.client.require_admin().await?;
        let url = format!("{}/users/{}", self.client.http.api_url(), id);
        self.client.http.put(&url, update).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), SdkError> {
        self.client.require_admin().await?;
        let url = format!("{}/users/{}", self.client.http.api_url(), id);
        let _: serde_json::Value = self.client.http.delete(&url).await?;
        Ok(())
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<(), SdkError> {
        self.client.require_admin().await?;
        self.client.orders().delete_unchecked(id).await
    }

    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), SdkError> {
        self.client.transactions().delete(id).await
    }

    /// Users, the first page of orders and the first page of transactions,
    /// fetched concurrently. Fails if any of the three fails.
    pub async fn dashboard(&self, query: &ListQuery) -> Result<Dashboard, SdkError> {
        self.client.require_admin().await?;
        let orders = self.client.orders();
        let transactions = self.client.transactions();
        let (users, orders, transactions) = try_join3(
            self.users(),
            orders.list(query),
            transactions.all(query),
        )
        .await?;
        Ok(Dashboard {
            users,
            orders,
            transactions,
        })
    }
}
