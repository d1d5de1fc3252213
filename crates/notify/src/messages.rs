//! Plain-text message builders for order notifications.
//!
//! One factory per message part; both lifecycle notices share the same
//! itemized breakdown so the customer and the staff read identical
//! numbers.

use std::fmt::Write as _;

use crate::{NotificationKind, OrderNotice};

/// Subject line for a notification.
#[must_use]
pub fn build_subject(kind: NotificationKind, notice: &OrderNotice) -> String {
    match kind {
        NotificationKind::OrderPending => {
            format!("Green Basket order received - {}", notice.order_id)
        }
        NotificationKind::OrderConfirmed => {
            format!("Green Basket order confirmed - {}", notice.order_id)
        }
    }
}

/// Body text for a notification.
#[must_use]
pub fn build_body(kind: NotificationKind, notice: &OrderNotice) -> String {
    let mut body = String::new();

    match kind {
        NotificationKind::OrderPending => {
            body.push_str("New wholesale order\n\n");
        }
        NotificationKind::OrderConfirmed => {
            body.push_str("Your wholesale order is confirmed\n\n");
        }
    }

    let _ = writeln!(body, "Business: {}", notice.business);
    let _ = writeln!(body, "Contact: {}", notice.contact_name);
    let _ = writeln!(body, "Phone: {}", notice.phone);
    let _ = writeln!(body, "Address: {}", notice.address);

    body.push_str("\nItems:\n");
    for line in &notice.lines {
        let _ = writeln!(
            body,
            "{}: {}{} @ {}/{} - {}",
            line.name, line.quantity, line.unit, line.rate, line.unit, line.line_total
        );
    }

    let _ = writeln!(body, "\nTotal: {}", notice.total);
    let _ = writeln!(body, "Order ID: {}", notice.order_id);

    match kind {
        NotificationKind::OrderPending => {
            body.push_str("\nWe will confirm availability and a delivery slot shortly.\n");
        }
        NotificationKind::OrderConfirmed => {
            body.push_str("\nOur team will reach out with the delivery slot. Payment on delivery.\n");
        }
    }

    body
}
