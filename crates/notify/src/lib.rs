//! Outbound order notifications for Green Basket.
//!
//! The notification transport is an external collaborator behind the
//! [`Notifier`] trait. Sends are fire-and-forget with respect to order
//! durability: the submission and approval workflows persist first, then
//! notify, and a failed send never rolls back the persisted state.
//!
//! [`EmailNotifier`] is the SMTP implementation; message text lives in
//! [`messages`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod email;
pub mod messages;

use async_trait::async_trait;

use green_basket_core::{CartItem, Email, Order, OrderId, Rupees};

pub use config::{ConfigError, EmailConfig};
pub use email::EmailNotifier;

/// Errors that can occur when sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport-level failure (SMTP connection, relay rejection).
    #[error("send failed: {0}")]
    Send(String),
    /// The message could not be built.
    #[error("failed to build message: {0}")]
    MessageBuild(String),
    /// A sender or recipient address was rejected by the transport.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// What happened to the best-effort notification that followed a durable
/// state change.
///
/// Submission and approval return this alongside their primary result so
/// callers can report "order placed, but we could not email you" instead
/// of collapsing both steps into a single error.
#[derive(Debug)]
pub enum NotificationStatus {
    /// The notice was handed to the transport.
    Sent,
    /// The transport failed; the primary state change stands.
    Failed(NotifyError),
}

impl NotificationStatus {
    /// Whether the notice went out.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Which lifecycle event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Order submitted, awaiting staff confirmation.
    OrderPending,
    /// Order approved by staff.
    OrderConfirmed,
}

/// One itemized line of an order notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeLine {
    /// Item display name.
    pub name: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit of sale.
    pub unit: String,
    /// Wholesale rate per unit.
    pub rate: Rupees,
    /// Quantity times rate.
    pub line_total: Rupees,
}

impl From<&CartItem> for NoticeLine {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            rate: item.price_per_kg,
            line_total: item.line_total(),
        }
    }
}

/// The payload of an order notification: everything the message builders
/// need, already snapshotted so the notice cannot drift from the order of
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNotice {
    /// Order of record.
    pub order_id: OrderId,
    /// Business name from the profile snapshot.
    pub business: String,
    /// Contact person from the profile snapshot.
    pub contact_name: String,
    /// Contact phone from the profile snapshot.
    pub phone: String,
    /// Delivery address from the profile snapshot.
    pub address: String,
    /// Itemized lines.
    pub lines: Vec<NoticeLine>,
    /// Order total.
    pub total: Rupees,
}

impl From<&Order> for OrderNotice {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            business: order.profile.business.clone(),
            contact_name: order.profile.name.clone(),
            phone: order.profile.phone.clone(),
            address: order.profile.address.clone(),
            lines: order.items.iter().map(NoticeLine::from).collect(),
            total: order.total_amount,
        }
    }
}

/// The outbound notification seam.
///
/// Implementations deliver a rendered notice to the recipient. Callers
/// treat failures as advisory: they are logged and reported, never used to
/// undo the state change the notice announces.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification of `kind` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns a transport or message-building error; the caller decides
    /// how to surface it.
    async fn send(
        &self,
        kind: NotificationKind,
        recipient: &Email,
        notice: &OrderNotice,
    ) -> Result<(), NotifyError>;
}
