//! Order submission and the customer's order history.
//!
//! Submission is a compound operation: validate, persist an immutable
//! snapshot, then notify. The persist step is the contract - once it
//! commits, the order exists no matter what happens to the notification
//! channel. The notify step is best-effort and its failure is reported
//! separately in the outcome, never by rolling the order back.

use std::sync::Arc;

use serde_json::json;
use tracing::instrument;

use green_basket_core::{CartItem, CustomerId, Order, OrderId, OrderStatus, Profile, cart_total};
use green_basket_datastore::{
    CollectionSync, DocumentStore, OrderBy, StoreError, collections, server_timestamp,
    sync::SyncFilter,
};
use green_basket_notify::{
    NotificationKind, NotificationStatus, Notifier, NoticeLine, NotifyError, OrderNotice,
};

/// Fixed origin tag stamped on orders submitted through this storefront.
pub const ORDER_SOURCE: &str = "web-storefront";

/// Errors from [`OrderSubmissionService::submit`].
///
/// The two validation cases are distinct on purpose: the UI shows
/// different, actionable messages for an empty cart and a missing profile.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Nothing in the cart; no order was written.
    #[error("cart is empty; add items from the catalog first")]
    EmptyCart,
    /// No profile for the submitting identity; no order was written.
    #[error("profile missing; complete your business profile before ordering")]
    MissingProfile,
    /// The remote write failed; no order was written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The result of a successful submission: the durable order plus the fate
/// of its best-effort notification.
#[derive(Debug)]
pub struct SubmitOutcome {
    /// Store-assigned identifier of the persisted order.
    pub order_id: OrderId,
    /// Whether the "order pending" notice went out.
    pub notification: NotificationStatus,
}

/// Validates cart and profile, persists the order snapshot, and fires the
/// "order pending" notification.
pub struct OrderSubmissionService {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
}

impl OrderSubmissionService {
    /// Create the service over its store and notifier seams.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Submit the given cart under the given profile.
    ///
    /// Persists a deep snapshot of both: the order's items, profile, and
    /// total are frozen at this moment and later edits to the live cart or
    /// profile never reach the record. `createdAt` is a server-assigned
    /// stamp so ordering holds across clients with skewed clocks.
    ///
    /// Does not clear the cart; that is the caller's decision after it has
    /// acknowledged the outcome.
    ///
    /// # Errors
    ///
    /// [`SubmitError::MissingProfile`] / [`SubmitError::EmptyCart`] when
    /// validation fails (nothing written), [`SubmitError::Store`] when the
    /// persist step fails (nothing written). Notification failure is not
    /// an error; it is reported in the outcome.
    #[instrument(skip(self, cart, profile), fields(lines = cart.len()))]
    pub async fn submit(
        &self,
        cart: &[CartItem],
        profile: Option<&Profile>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let profile = profile.ok_or(SubmitError::MissingProfile)?;
        if cart.is_empty() {
            return Err(SubmitError::EmptyCart);
        }

        let total = cart_total(cart);
        let payload = json!({
            "items": cart,
            "totalAmount": total,
            "profile": profile,
            "createdAt": server_timestamp(),
            "status": OrderStatus::Pending,
            "source": ORDER_SOURCE,
        });

        let document_id = self.store.create(collections::ORDERS, payload).await?;
        let order_id = OrderId::new(document_id.as_uuid());
        tracing::info!(
            order_id = %order_id,
            business = %profile.business,
            total = %total,
            "Order submitted"
        );

        let notice = OrderNotice {
            order_id,
            business: profile.business.clone(),
            contact_name: profile.name.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            lines: cart.iter().map(NoticeLine::from).collect(),
            total,
        };
        let notification = match self
            .notifier
            .send(NotificationKind::OrderPending, &profile.email, &notice)
            .await
        {
            Ok(()) => NotificationStatus::Sent,
            Err(error) => {
                // The order of record stands; the gap is reported, not fatal.
                tracing::error!(order_id = %order_id, %error, "Failed to send pending notification");
                NotificationStatus::Failed(error)
            }
        };

        Ok(SubmitOutcome {
            order_id,
            notification,
        })
    }
}

/// The customer's own orders, newest first, kept current by subscription.
///
/// The same projection the admin console uses, narrowed to one identity.
pub struct OrderHistory {
    sync: CollectionSync<Order>,
}

impl OrderHistory {
    /// Subscribe to the orders submitted by `customer`.
    ///
    /// # Errors
    ///
    /// Returns an error when the store subscription cannot be established.
    pub async fn subscribe(
        store: &dyn DocumentStore,
        customer: CustomerId,
    ) -> Result<Self, StoreError> {
        let filter: SyncFilter<Order> = Arc::new(move |order: &Order| order.profile.id == customer);
        let sync = CollectionSync::subscribe_filtered(
            store,
            collections::ORDERS,
            OrderBy::desc("createdAt"),
            Some(filter),
        )
        .await?;
        Ok(Self { sync })
    }

    /// Latest materialized list.
    #[must_use]
    pub fn current(&self) -> Vec<Order> {
        self.sync.current()
    }

    /// Wait for the next republished list.
    ///
    /// # Errors
    ///
    /// Returns an error when the projection has shut down.
    pub async fn changed(&mut self) -> Result<(), tokio::sync::watch::error::RecvError> {
        self.sync.changed().await
    }
}

/// Convenience for surfacing a notification gap to the caller's UI layer.
#[must_use]
pub fn notification_warning(status: &NotificationStatus) -> Option<String> {
    match status {
        NotificationStatus::Sent => None,
        NotificationStatus::Failed(error) => Some(notification_gap_message(error)),
    }
}

fn notification_gap_message(error: &NotifyError) -> String {
    format!("Your order is placed and safe; we could not email the summary ({error}). Our team still sees the order.")
}
