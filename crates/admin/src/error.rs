//! Unified error handling for the admin console core.

use thiserror::Error;

use green_basket_core::AuthError;
use green_basket_datastore::StoreError;
use green_basket_notify::NotifyError;

use crate::approval::ApprovalError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Approval workflow failed.
    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    /// Admin verification denied or failed (render-time gate checks).
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Notification send failed.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
