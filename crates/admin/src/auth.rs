//! Administrator authorization.
//!
//! Authorization is a capability, not a flag: the only way to act as an
//! administrator is to hold an [`AdminClaims`] value, and the only way to
//! get one is through a verifier that inspects a verified identity claim.
//! The gate fails closed - no identity, unverified, in flight, or errored
//! all deny - and every surface that exposes an admin action re-verifies
//! through the same gate at render time.

use std::sync::Arc;

use async_trait::async_trait;

use green_basket_core::{AdminClaims, AuthError, CurrentUser};

/// Resolves a verified administrator claim for an identity.
///
/// Implementations talk to the identity provider (token refresh, custom
/// claims); they never trust anything the client supplied directly.
#[async_trait]
pub trait AdminVerifier: Send + Sync {
    /// Verify that `user` carries the administrator claim.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAdmin`] when the verified token has no such claim;
    /// [`AuthError::Verification`] when verification itself failed.
    async fn verify(&self, user: &CurrentUser) -> Result<AdminClaims, AuthError>;
}

/// The fail-closed gate in front of every admin action.
#[derive(Clone)]
pub struct AdminGate {
    verifier: Arc<dyn AdminVerifier>,
}

impl AdminGate {
    /// Create a gate over a verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn AdminVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolve the administrator claim or deny.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotSignedIn`] without an identity, and whatever the
    /// verifier reports otherwise. Every error path is a denial; there is
    /// no partially-authorized state.
    pub async fn require_admin(
        &self,
        user: Option<&CurrentUser>,
    ) -> Result<AdminClaims, AuthError> {
        let user = user.ok_or(AuthError::NotSignedIn)?;
        match self.verifier.verify(user).await {
            Ok(claims) => Ok(claims),
            Err(error) => {
                tracing::warn!(customer_id = %user.id, %error, "Admin verification denied");
                Err(error)
            }
        }
    }
}
