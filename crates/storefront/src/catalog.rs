//! Catalog feed rows.
//!
//! The catalog is a read-only external feed (a spreadsheet-backed sheet of
//! produce rows); fetching it is outside this core. This module owns the
//! row shape and its lossy-tolerant conversion into a cart line: missing
//! skus fall back to the name, prices fall back across columns, and the
//! minimum order defaults to 10.

use rust_decimal::Decimal;
use serde::Deserialize;

use green_basket_core::{CartItem, DEFAULT_MIN_ORDER, Rupees};

/// One row of the produce catalog feed.
///
/// The feed is hand-maintained, so everything beyond the name is optional
/// and flag columns arrive as "Yes"/"yes" strings rather than booleans.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub indian_name: Option<String>,
    #[serde(default)]
    pub price_per_kg: Option<Decimal>,
    /// Legacy price column, used when `price_per_kg` is absent.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_order: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub featured: Option<String>,
}

impl CatalogRow {
    /// Stable key for the row: the sku, falling back to the name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.sku.as_deref().unwrap_or(&self.name)
    }

    /// Whether the row is published to customers.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.active.as_deref(), Some("Yes" | "yes"))
    }

    /// Whether the row is highlighted on the home page.
    #[must_use]
    pub fn is_featured(&self) -> bool {
        matches!(self.featured.as_deref(), Some("Yes" | "yes"))
    }

    /// Whether the advisory stock figure permits display. Rows without a
    /// stock column are shown.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|stock| stock > 0)
    }

    /// The wholesale rate, falling back across price columns; missing or
    /// negative prices become zero.
    #[must_use]
    pub fn rate(&self) -> Rupees {
        let raw = self.price_per_kg.or(self.price).unwrap_or(Decimal::ZERO);
        if raw < Decimal::ZERO {
            Rupees::ZERO
        } else {
            Rupees::new(raw)
        }
    }

    /// Convert the row into a cart line candidate.
    ///
    /// The quantity starts at the minimum order; the cart store owns every
    /// later quantity change.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        let min_order = match self.min_order {
            Some(min) if min > 0 => min,
            _ => DEFAULT_MIN_ORDER,
        };
        CartItem {
            sku: self.key().to_owned(),
            name: self.name.clone(),
            indian_name: self.indian_name.clone(),
            price_per_kg: self.rate(),
            unit: self.unit.clone().unwrap_or_else(|| "kg".to_owned()),
            min_order,
            quantity: min_order,
            image_url: self.image_url.clone(),
            stock: self.stock,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_key_falls_back_to_name() {
        let row = CatalogRow {
            name: "Tomato".to_owned(),
            ..CatalogRow::default()
        };
        assert_eq!(row.key(), "Tomato");

        let row = CatalogRow {
            sku: Some("tomato-desi".to_owned()),
            name: "Tomato".to_owned(),
            ..CatalogRow::default()
        };
        assert_eq!(row.key(), "tomato-desi");
    }

    #[test]
    fn test_rate_falls_back_across_columns() {
        let row = CatalogRow {
            name: "Onion".to_owned(),
            price: Some(Decimal::from(15)),
            ..CatalogRow::default()
        };
        assert_eq!(row.rate(), Rupees::from_whole(15));

        let row = CatalogRow {
            name: "Onion".to_owned(),
            price_per_kg: Some(Decimal::from(18)),
            price: Some(Decimal::from(15)),
            ..CatalogRow::default()
        };
        assert_eq!(row.rate(), Rupees::from_whole(18));

        let row = CatalogRow {
            name: "Onion".to_owned(),
            ..CatalogRow::default()
        };
        assert_eq!(row.rate(), Rupees::ZERO);
    }

    #[test]
    fn test_yes_flags_are_case_tolerant() {
        let mut row = CatalogRow {
            name: "Tomato".to_owned(),
            active: Some("yes".to_owned()),
            featured: Some("No".to_owned()),
            ..CatalogRow::default()
        };
        assert!(row.is_active());
        assert!(!row.is_featured());

        row.active = None;
        assert!(!row.is_active());
    }

    #[test]
    fn test_to_cart_item_defaults() {
        let row = CatalogRow {
            name: "Spinach".to_owned(),
            price_per_kg: Some(Decimal::from(40)),
            stock: Some(120),
            ..CatalogRow::default()
        };
        let item = row.to_cart_item();
        assert_eq!(item.sku, "Spinach");
        assert_eq!(item.unit, "kg");
        assert_eq!(item.min_order, DEFAULT_MIN_ORDER);
        assert_eq!(item.quantity, DEFAULT_MIN_ORDER);
        assert_eq!(item.stock, Some(120));
    }

    #[test]
    fn test_stock_gates_display_only_when_present() {
        let mut row = CatalogRow {
            name: "Peas".to_owned(),
            ..CatalogRow::default()
        };
        assert!(row.in_stock());
        row.stock = Some(0);
        assert!(!row.in_stock());
    }
}
