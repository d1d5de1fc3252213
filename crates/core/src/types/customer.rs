//! Business customer profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::CustomerId;

/// A business customer's profile, keyed by the authenticated identity.
///
/// The remote `customers/{id}` document is the source of truth; the
/// storefront holds a read-through mirror kept current by subscription.
/// Created on signup, mutated only by its owner, never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Owning identity; equal to the document ID.
    pub id: CustomerId,
    /// Contact person.
    pub name: String,
    /// Registered business name.
    pub business: String,
    /// Contact phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Contact email; notification recipient.
    pub email: Email,
    /// GST registration number, if the business has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,
    /// Server-assigned creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Server-assigned time of the last owner update.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A partial profile mutation.
///
/// Unset fields are preserved by the merge write, never cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.business.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.email.is_none()
            && self.gst.is_none()
    }
}
