//! Order approval workflow.
//!
//! Approval is the one privileged mutation in the system and the only
//! writer of an order's `status`. The transition is monotonic (Pending to
//! Approved, never back) and idempotent: re-approving an approved order is
//! a no-op with no second notification, because the action can arrive
//! twice under network retries or duplicate clicks. The confirmation
//! notice is best-effort; once the status write commits, the order stays
//! approved regardless of the notification outcome.

use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use green_basket_core::{AuthError, CurrentUser, Order, OrderId, OrderStatus};
use green_basket_datastore::{
    DocumentId, DocumentStore, StoreError, collections, server_timestamp,
};
use green_basket_notify::{NotificationKind, NotificationStatus, Notifier, OrderNotice};

use crate::auth::AdminGate;

/// Errors from [`AdminApprovalService::approve`].
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The actor is not a verified administrator. Fails closed: no state
    /// change, no notification.
    #[error("not authorized to approve orders: {0}")]
    Unauthorized(#[from] AuthError),
    /// The order record no longer exists in the store.
    #[error("order {0} not found")]
    NotFound(OrderId),
    /// The store rejected the read or the status write.
    #[error(transparent)]
    Store(StoreError),
}

/// What an approval call did.
#[derive(Debug)]
pub enum ApprovalOutcome {
    /// The transition happened now, with the fate of its notice.
    Approved {
        /// Whether the "order confirmed" notice went out.
        notification: NotificationStatus,
    },
    /// The order was already approved; nothing changed and nothing was
    /// re-sent.
    AlreadyApproved,
}

impl ApprovalOutcome {
    /// Whether this call performed the transition.
    #[must_use]
    pub const fn transitioned(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}

/// Transitions orders from Pending to Approved and fires the confirmation
/// notice.
pub struct AdminApprovalService {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    gate: AdminGate,
}

impl AdminApprovalService {
    /// Create the service over its store, notifier, and gate.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>, gate: AdminGate) -> Self {
        Self {
            store,
            notifier,
            gate,
        }
    }

    /// Approve an order.
    ///
    /// The actor's administrator claim is verified first; any verification
    /// failure denies with no state change. The order record is re-read
    /// before writing so a duplicate call - even one racing a stale
    /// argument - resolves to [`ApprovalOutcome::AlreadyApproved`] instead
    /// of a second transition or a second notice.
    ///
    /// # Errors
    ///
    /// [`ApprovalError::Unauthorized`] on any denial,
    /// [`ApprovalError::NotFound`] when the record is gone,
    /// [`ApprovalError::Store`] when the read or write fails. Notification
    /// failure is reported in the outcome, never as an error.
    #[instrument(skip(self, actor, order), fields(order_id = %order.id))]
    pub async fn approve(
        &self,
        actor: Option<&CurrentUser>,
        order: &Order,
    ) -> Result<ApprovalOutcome, ApprovalError> {
        let claims = self.gate.require_admin(actor).await?;

        if order.status.is_approved() {
            tracing::debug!(order_id = %order.id, "Order already approved; no-op");
            return Ok(ApprovalOutcome::AlreadyApproved);
        }

        // Re-read the record: the argument may be stale under retries.
        let document_id = DocumentId::new(order.id.as_uuid());
        let document = self
            .store
            .get(collections::ORDERS, document_id)
            .await
            .map_err(ApprovalError::Store)?
            .ok_or(ApprovalError::NotFound(order.id))?;
        let current: Order = document.decode().map_err(ApprovalError::Store)?;
        if current.status.is_approved() {
            tracing::debug!(order_id = %order.id, "Order already approved remotely; no-op");
            return Ok(ApprovalOutcome::AlreadyApproved);
        }

        self.store
            .merge(
                collections::ORDERS,
                document_id,
                json!({
                    "status": OrderStatus::Approved,
                    "approvedAt": server_timestamp(),
                }),
            )
            .await
            .map_err(ApprovalError::Store)?;
        tracing::info!(
            order_id = %order.id,
            approved_by = %claims.email,
            "Order approved"
        );

        let notice = OrderNotice::from(&current);
        let notification = match self
            .notifier
            .send(
                NotificationKind::OrderConfirmed,
                &current.profile.email,
                &notice,
            )
            .await
        {
            Ok(()) => NotificationStatus::Sent,
            Err(error) => {
                // Approved is the durable fact; the notice is advisory.
                tracing::error!(order_id = %order.id, %error, "Failed to send confirmation notification");
                NotificationStatus::Failed(error)
            }
        };

        Ok(ApprovalOutcome::Approved { notification })
    }
}
