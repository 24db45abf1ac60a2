//! Mutation requests issued on behalf of the shopper.
//!
//! These are plain values: the storefront's dispatcher turns them into
//! HTTP calls. A cart line is never updated to quantity 0; dropping below 1
//! always becomes a [`CartCommand::Remove`].

use serde::{Deserialize, Serialize};

use crate::membership::find_by_product;
use crate::types::{CartItem, CartItemId, ProductId, UserId, WishlistItem, WishlistItemId};

/// Payload for adding a product to a cart or wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub user: UserId,
    pub product: ProductId,
}

/// Payload for changing a cart line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Add(NewLineItem),
    Update { id: CartItemId, quantity: u32 },
    Remove { id: CartItemId },
}

impl CartCommand {
    /// Add `product` to `user`'s cart.
    #[must_use]
    pub fn add(user: UserId, product: ProductId) -> Self {
        Self::Add(NewLineItem { user, product })
    }

    /// One more unit of `item`. Stock limits are enforced by the remote API.
    #[must_use]
    pub fn increment(item: &CartItem) -> Self {
        Self::Update {
            id: item.id.clone(),
            quantity: item.quantity.saturating_add(1),
        }
    }

    /// One fewer unit of `item`; the last unit removes the line.
    #[must_use]
    pub fn decrement(item: &CartItem) -> Self {
        if item.quantity <= 1 {
            Self::Remove {
                id: item.id.clone(),
            }
        } else {
            Self::Update {
                id: item.id.clone(),
                quantity: item.quantity - 1,
            }
        }
    }

    /// Drop `item` from the cart regardless of quantity.
    #[must_use]
    pub fn remove(item: &CartItem) -> Self {
        Self::Remove {
            id: item.id.clone(),
        }
    }
}

/// A wishlist mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistCommand {
    Add(NewLineItem),
    Remove { id: WishlistItemId },
}

impl WishlistCommand {
    /// Command for the wishlist heart being checked or unchecked.
    ///
    /// Returns `None` when there is nothing to do: checking a product that
    /// is already wishlisted, or unchecking one that is not.
    #[must_use]
    pub fn toggle(
        items: &[WishlistItem],
        user: &UserId,
        product: &ProductId,
        checked: bool,
    ) -> Option<Self> {
        let existing = find_by_product(items, product);
        match (checked, existing) {
            (true, None) => Some(Self::Add(NewLineItem {
                user: user.clone(),
                product: product.clone(),
            })),
            (false, Some(item)) => Some(Self::Remove {
                id: item.id.clone(),
            }),
            (true, Some(_)) | (false, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductRef;

    fn cart_item(quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new("ci1"),
            user: UserId::new("u1"),
            product: ProductRef::Id(ProductId::new("p1")),
            quantity,
        }
    }

    fn wishlist() -> Vec<WishlistItem> {
        vec![WishlistItem {
            id: WishlistItemId::new("w1"),
            user: UserId::new("u1"),
            product: ProductRef::Id(ProductId::new("p1")),
        }]
    }

    #[test]
    fn test_increment_is_unbounded_update() {
        assert_eq!(
            CartCommand::increment(&cart_item(1)),
            CartCommand::Update {
                id: CartItemId::new("ci1"),
                quantity: 2
            }
        );
        assert_eq!(
            CartCommand::increment(&cart_item(500)),
            CartCommand::Update {
                id: CartItemId::new("ci1"),
                quantity: 501
            }
        );
    }

    #[test]
    fn test_decrement_last_unit_removes_line() {
        assert_eq!(
            CartCommand::decrement(&cart_item(1)),
            CartCommand::Remove {
                id: CartItemId::new("ci1")
            }
        );
    }

    #[test]
    fn test_decrement_above_one_updates() {
        assert_eq!(
            CartCommand::decrement(&cart_item(3)),
            CartCommand::Update {
                id: CartItemId::new("ci1"),
                quantity: 2
            }
        );
    }

    #[test]
    fn test_add_payload_shape() {
        let CartCommand::Add(payload) = CartCommand::add(UserId::new("u1"), ProductId::new("p1"))
        else {
            panic!("expected an add command");
        };
        assert_eq!(
            serde_json::to_value(&payload).ok(),
            Some(serde_json::json!({ "user": "u1", "product": "p1" }))
        );
    }

    #[test]
    fn test_wishlist_toggle_check_adds() {
        let command =
            WishlistCommand::toggle(&wishlist(), &UserId::new("u1"), &ProductId::new("p2"), true);
        assert_eq!(
            command,
            Some(WishlistCommand::Add(NewLineItem {
                user: UserId::new("u1"),
                product: ProductId::new("p2"),
            }))
        );
    }

    #[test]
    fn test_wishlist_toggle_uncheck_removes_matching_entry() {
        let command =
            WishlistCommand::toggle(&wishlist(), &UserId::new("u1"), &ProductId::new("p1"), false);
        assert_eq!(
            command,
            Some(WishlistCommand::Remove {
                id: WishlistItemId::new("w1")
            })
        );
    }

    #[test]
    fn test_wishlist_toggle_noops() {
        let user = UserId::new("u1");
        assert_eq!(
            WishlistCommand::toggle(&wishlist(), &user, &ProductId::new("p1"), true),
            None
        );
        assert_eq!(
            WishlistCommand::toggle(&wishlist(), &user, &ProductId::new("p2"), false),
            None
        );
    }
}
