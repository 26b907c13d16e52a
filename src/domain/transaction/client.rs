//! Transactions sub-client — history, cancel, delete.

use crate::client::FxMarketClient;
use crate::error::SdkError;
use crate::shared::{ListQuery, Listing, Page, SortOrder, TransactionId};

use super::Transaction;

pub struct Transactions<'a> {
    pub(crate) client: &'a FxMarketClient,
}

impl<'a> Transactions<'a> {
    /// The signed-in user's transactions. Unsorted queries default to
    /// newest first.
    pub async fn mine(&self, query: &ListQuery) -> Result<Page<Transaction>, SdkError> {
        let query = match query.sort_field {
            Some(_) => query.clone(),
            None => query.clone().sort("createdAt", SortOrder::Desc),
        };
        let url = format!(
            "{}/transactions/user?{}",
            self.client.http.api_url(),
            query.to_query_string()
        );
        self.client.http.get(&url).await
    }

    /// All transactions, as listed for the admin dashboard.
    pub async fn all(&self, query: &ListQuery) -> Result<Page<Transaction>, SdkError> {
        let url = format!(
            "{}/transactions?{}",
            self.client.http.api_url(),
            query.to_query_string()
        );
        self.client.http.get(&url).await
    }

    /// Cancel a pending transaction. Anything else is refused locally.
    pub async fn cancel(&self, transaction: &Transaction) -> Result<serde_json::Value, SdkError> {
        transaction.ensure_cancellable()?;
        let url = format!(
            "{}/transactions/{}/cancel",
            self.client.http.api_url(),
            transaction.id
        );
        self.client.http.patch(&url, None::<&()>).await
    }

    /// Admin only.
    pub async fn delete(&self, id: TransactionId) -> Result<(), SdkError> {
        self.client.require_admin().await?;
        let url = format!("{}/transactions/{}", self.client.http.api_url(), id);
        let _: serde_json::Value = self.client.http.delete(&url).await?;
        Ok(())
    }

    /// Refetch the listing's current page of the user's transactions.
    pub async fn reload(&self, listing: &mut Listing<Transaction>) -> Result<(), SdkError> {
        let query = listing.query();
        let page = self.mine(&query).await?;
        listing.apply(query.page, page);
        Ok(())
    }

    /// Like [`reload`](Self::reload), but a failure is only logged.
    pub async fn reload_best_effort(&self, listing: &mut Listing<Transaction>) -> bool {
        match self.reload(listing).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "transaction list refresh failed");
                false
            }
        }
    }
}
