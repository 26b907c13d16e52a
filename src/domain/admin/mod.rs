//! Admin domain — user records and the moderation dashboard.

#[cfg(feature = "http")]
pub mod client;

use crate::auth::Role;
use crate::domain::order::Order;
use crate::domain::transaction::Transaction;
use crate::shared::{Page, UserId};
use serde::{Deserialize, Serialize};

/// A user as listed by `GET /api/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub verified: bool,
    /// Opaque; only ever echoed back on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Body of `PUT /api/users/:id`. Unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

/// The full record, as the admin edit form resubmits it.
impl From<&UserRecord> for UserUpdate {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: Some(user.username.clone()),
            phone: user.phone.clone(),
            role: user.role,
            verified: Some(user.verified),
            password_hash: user.password_hash.clone(),
        }
    }
}

/// Everything the moderation screen shows, fetched in one go.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub users: Vec<UserRecord>,
    pub orders: Page<Order>,
    pub transactions: Page<Transaction>,
}

impl Dashboard {
    pub fn unverified_users(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.iter().filter(|u| !u.verified)
    }
}
