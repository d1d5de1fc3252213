//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// The two-state approval lifecycle of an order.
///
/// Every order is created `Pending` and transitions at most once to
/// `Approved`. There is no reverse transition and no further state; the
/// transition is guarded by [`OrderStatus::can_approve`] and performed only
/// by the admin approval service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Submitted and awaiting staff confirmation.
    #[default]
    Pending,
    /// Confirmed by staff; terminal.
    Approved,
}

impl OrderStatus {
    /// Whether the order has reached the terminal state.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Whether an approval transition is still permitted.
    #[must_use]
    pub const fn can_approve(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
