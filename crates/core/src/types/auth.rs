//! Identity types.
//!
//! Authentication itself is an external collaborator. The storefront and
//! admin crates consume identity as data: a nullable current user delivered
//! over a watch channel, and a verified administrator claim resolved
//! through the admin crate's verifier seam.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::CustomerId;

/// The currently signed-in identity, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Stable identity; also the key of the user's profile document.
    pub id: CustomerId,
    /// Sign-in email.
    pub email: Email,
    /// Display name, when the provider has one.
    pub display_name: Option<String>,
}

/// A verified administrator claim.
///
/// Only ever constructed by an `AdminVerifier` from a verified token, never
/// from client-supplied flags. Holding a value of this type is the
/// capability to approve orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClaims {
    /// The verified identity the claim belongs to.
    pub subject: CustomerId,
    /// Email recorded on the verified token.
    pub email: Email,
    /// Role string from the token, kept for audit logging.
    pub role: String,
}

/// Errors from identity and claim verification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// No identity is signed in.
    #[error("not signed in")]
    NotSignedIn,
    /// The identity is valid but carries no administrator claim.
    #[error("administrator role required")]
    NotAdmin,
    /// The claim could not be verified (network, token refresh, provider
    /// outage). Callers deny access on this variant.
    #[error("claim verification failed: {0}")]
    Verification(String),
}
