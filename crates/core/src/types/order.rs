//! Persisted order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::customer::Profile;
use super::id::OrderId;
use super::price::Rupees;
use super::status::OrderStatus;

/// An immutable, persisted snapshot of a cart plus profile.
///
/// `items` and `profile` are frozen at submission time: later edits to the
/// live cart, the live profile, or catalog prices never reach a persisted
/// order. The only field that changes after creation is the approval pair
/// (`status`, `approved_at`), written once by the admin approval service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Store-assigned identifier.
    pub id: OrderId,
    /// Cart snapshot at submission.
    pub items: Vec<CartItem>,
    /// Total computed from the snapshot at submission.
    pub total_amount: Rupees,
    /// Profile snapshot at submission.
    pub profile: Profile,
    /// Server-assigned creation time. `None` only while the server stamp
    /// has not resolved; such orders are dropped from analytics.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Lifecycle state.
    #[serde(default)]
    pub status: OrderStatus,
    /// Server-assigned approval time; set exactly when `status` flips.
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Fixed origin tag of the submitting client.
    pub source: String,
}

impl Order {
    /// Number of distinct lines in the snapshot.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Recompute the total from the snapshot lines.
    ///
    /// Always equals `total_amount` for orders written by the submission
    /// workflow; kept for integrity checks in tests and audits.
    #[must_use]
    pub fn computed_total(&self) -> Rupees {
        super::cart::cart_total(&self.items)
    }
}
