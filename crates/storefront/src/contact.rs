//! Contact-form business leads.
//!
//! Leads are write-once documents: created here, read by the admin
//! console, never mutated afterwards. They sit outside the order
//! lifecycle and carry no status field.

use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use green_basket_core::{Email, EmailError, LeadId};
use green_basket_datastore::{DocumentStore, StoreError, collections, server_timestamp};

/// Raw contact-form input, as typed by the visitor.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub business: String,
    pub message: String,
}

/// Errors from [`ContactLeadService::submit`].
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The email address did not parse.
    #[error("please enter a valid email address")]
    InvalidEmail(#[from] EmailError),
    /// Name and message are mandatory.
    #[error("name and message are required")]
    MissingFields,
    /// The remote write failed; nothing was recorded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates and records business leads.
pub struct ContactLeadService {
    store: Arc<dyn DocumentStore>,
}

impl ContactLeadService {
    /// Create the service over its store seam.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validate and persist one lead, returning its assigned ID.
    ///
    /// # Errors
    ///
    /// Validation errors reject synchronously with nothing written;
    /// [`ContactError::Store`] surfaces a failed write.
    #[instrument(skip(self, form), fields(business = %form.business))]
    pub async fn submit(&self, form: ContactForm) -> Result<LeadId, ContactError> {
        let email = Email::parse(&form.email.trim().to_lowercase())?;

        if form.name.trim().is_empty() || form.message.trim().is_empty() {
            return Err(ContactError::MissingFields);
        }

        let payload = json!({
            "name": form.name.trim(),
            "email": email,
            "phone": form.phone.trim(),
            "business": form.business.trim(),
            "message": form.message.trim(),
            "createdAt": server_timestamp(),
        });
        let document_id = self
            .store
            .create(collections::CONTACT_REQUESTS, payload)
            .await?;
        let lead_id = LeadId::new(document_id.as_uuid());

        tracing::info!(lead_id = %lead_id, email = %email, "Contact lead recorded");
        Ok(lead_id)
    }
}
