//! Cart and wishlist membership predicates.

use serde::Serialize;

use crate::types::{CartItem, ProductId, ProductLine, WishlistItem};

/// Whether any entry in `items` points at `product_id`.
#[must_use]
pub fn is_member<T: ProductLine>(items: &[T], product_id: &ProductId) -> bool {
    items.iter().any(|item| item.product_id() == product_id)
}

/// The entry in `items` that points at `product_id`, if any.
#[must_use]
pub fn find_by_product<'a, T: ProductLine>(
    items: &'a [T],
    product_id: &ProductId,
) -> Option<&'a T> {
    items.iter().find(|item| item.product_id() == product_id)
}

/// Cart and wishlist membership of one product, as shown on its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Membership {
    pub in_cart: bool,
    pub in_wishlist: bool,
}

impl Membership {
    /// Compute membership of `product_id` in the shopper's collections.
    #[must_use]
    pub fn of(product_id: &ProductId, cart: &[CartItem], wishlist: &[WishlistItem]) -> Self {
        Self {
            in_cart: is_member(cart, product_id),
            in_wishlist: is_member(wishlist, product_id),
        }
    }
}
