//! Unified error handling for the storefront.
//!
//! Workflow-specific errors (`SubmitError`, `SaveError`, `ContactError`)
//! stay close to their services; `AppError` is the unifying type an
//! embedding shell returns from its handlers. The taxonomy separates what
//! the caller can fix (validation), what the store rejected
//! (persistence), and what only affected the side channel (notification).

use thiserror::Error;

use green_basket_datastore::StoreError;
use green_basket_notify::NotifyError;

use crate::contact::ContactError;
use crate::orders::SubmitError;
use crate::profile::SaveError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order submission failed.
    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    /// Profile save failed.
    #[error("Profile error: {0}")]
    Profile(#[from] SaveError),

    /// Contact lead submission failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Notification send failed.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

impl AppError {
    /// User-facing message for this error.
    ///
    /// Validation conditions get distinct, actionable text; store and
    /// transport internals are not exposed to customers.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Submit(SubmitError::EmptyCart) => {
                "Your cart is empty. Add items from the catalog first.".to_owned()
            }
            Self::Submit(SubmitError::MissingProfile) => {
                "Please complete your business profile before placing an order.".to_owned()
            }
            Self::Profile(SaveError::Unauthenticated) => {
                "Please sign in to save your profile.".to_owned()
            }
            Self::Contact(error @ (ContactError::InvalidEmail(_) | ContactError::MissingFields)) => {
                error.to_string()
            }
            Self::Submit(SubmitError::Store(_))
            | Self::Profile(SaveError::Store(_))
            | Self::Contact(ContactError::Store(_))
            | Self::Store(_) => "Could not save right now. Please try again.".to_owned(),
            Self::Notify(_) => {
                "Saved, but we could not send the confirmation email.".to_owned()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
