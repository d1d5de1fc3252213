//! Cart line items and total computation.

use serde::{Deserialize, Serialize};

use super::price::Rupees;

/// Minimum order quantity applied when a catalog row does not specify one.
pub const DEFAULT_MIN_ORDER: u32 = 10;

/// Sanity ceiling for a single line's quantity (kg).
pub const MAX_LINE_QUANTITY: u32 = 50_000;

/// One line of a cart: a catalog item plus the selected quantity.
///
/// A cart never holds two lines with the same `sku`, and `quantity` never
/// drops below `min_order`. Both invariants are maintained by the cart
/// store; an order snapshots these lines verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key within a cart (catalog sku, falling back to the name).
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Vernacular name from the catalog, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indian_name: Option<String>,
    /// Wholesale rate per unit.
    pub price_per_kg: Rupees,
    /// Unit of sale, almost always "kg".
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Minimum order quantity; also the re-add increment.
    #[serde(default = "default_min_order")]
    pub min_order: u32,
    /// Selected quantity, always `>= min_order`.
    pub quantity: u32,
    /// Catalog image, advisory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Advisory stock figure from the catalog; not a reserved resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

fn default_unit() -> String {
    "kg".to_owned()
}

const fn default_min_order() -> u32 {
    DEFAULT_MIN_ORDER
}

impl CartItem {
    /// Price for this line at the selected quantity.
    #[must_use]
    pub fn line_total(&self) -> Rupees {
        self.price_per_kg.times(self.quantity)
    }
}

/// Sum of `price_per_kg * quantity` over all lines.
///
/// A pure function of the given state: both the cart store and the order
/// submission workflow compute totals through here, so the persisted
/// `totalAmount` always matches what the cart displayed.
#[must_use]
pub fn cart_total(items: &[CartItem]) -> Rupees {
    items.iter().map(CartItem::line_total).sum()
}
