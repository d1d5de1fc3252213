//! Business leads from the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::LeadId;

/// A contact-form submission from a prospective business customer.
///
/// Write-once: created by the storefront contact flow, read by the admin
/// console, never mutated. Leads sit outside the order lifecycle and carry
/// no status field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLead {
    /// Store-assigned identifier.
    pub id: LeadId,
    /// Contact person.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone.
    pub phone: String,
    /// Business name.
    pub business: String,
    /// Free-form enquiry text.
    pub message: String,
    /// Server-assigned creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
