//! Cart aggregate totals.
//!
//! Shipping and taxes are flat amounts configured for the store; they do
//! not depend on weight, address or jurisdiction.

use serde::{Deserialize, Serialize};

use crate::types::{CartItem, Price, Product};

/// Flat charges added on top of the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    pub shipping: Price,
    pub taxes: Price,
}

impl Default for Charges {
    fn default() -> Self {
        Self {
            shipping: Price::from_cents(555),
            taxes: Price::from(5),
        }
    }
}

/// Aggregates shown on the cart and checkout pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Price,
    pub total_item_count: u32,
    pub shipping: Price,
    pub taxes: Price,
    pub grand_total: Price,
    /// Lines whose product could not be resolved to a price.
    pub unpriced_lines: usize,
}

impl CartTotals {
    /// Compute totals for `items`.
    ///
    /// A line's unit price comes from its populated product, or else from
    /// the matching entry in `catalog`. Lines that resolve to neither still
    /// count towards `total_item_count` but add nothing to the subtotal.
    #[must_use]
    pub fn compute(items: &[CartItem], catalog: &[Product], charges: Charges) -> Self {
        let mut subtotal = Price::ZERO;
        let mut total_item_count: u32 = 0;
        let mut unpriced_lines = 0;

        for item in items {
            total_item_count = total_item_count.saturating_add(item.quantity);
            match unit_price(item, catalog) {
                Some(price) => subtotal = subtotal + price.times(item.quantity),
                None => unpriced_lines += 1,
            }
        }

        Self {
            subtotal,
            total_item_count,
            shipping: charges.shipping,
            taxes: charges.taxes,
            grand_total: subtotal + charges.shipping + charges.taxes,
            unpriced_lines,
        }
    }
}

fn unit_price(item: &CartItem, catalog: &[Product]) -> Option<Price> {
    if let Some(product) = item.product.product() {
        return Some(product.price);
    }
    let id = item.product.id();
    catalog
        .iter()
        .find(|product| &product.id == id)
        .map(|product| product.price)
}
