//! Catalog and shopper records as served by the remote API.
//!
//! Field names on the wire follow the API (`_id`, `stockQuantity`,
//! `isAdmin`). References that the API may either populate or leave as a
//! bare id are modelled as untagged enums.

use serde::{Deserialize, Serialize};

use super::id::{BrandId, CartItemId, CategoryId, ProductId, UserId, WishlistItemId};
use super::price::Price;

// =============================================================================
// Catalog
// =============================================================================

/// A product category. The name is the key used for group membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
}

/// Brand of a product: populated record or bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrandRef {
    Embedded(Brand),
    Id(BrandId),
}

impl BrandRef {
    /// The brand id, whichever form the reference takes.
    #[must_use]
    pub const fn id(&self) -> &BrandId {
        match self {
            Self::Embedded(brand) => &brand.id,
            Self::Id(id) => id,
        }
    }

    /// The brand name, if the record was populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded(brand) => Some(&brand.name),
            Self::Id(_) => None,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub brand: BrandRef,
    pub category: CategoryId,
    #[serde(default)]
    pub stock_quantity: u32,
    /// Soft-deleted products are hidden from shoppers but listed for admins.
    #[serde(default)]
    pub is_deleted: bool,
}

// =============================================================================
// Shopper collections
// =============================================================================

/// Product of a cart or wishlist entry: populated record or bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Embedded(Box<Product>),
    Id(ProductId),
}

impl ProductRef {
    /// The product id, whichever form the reference takes.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Embedded(product) => &product.id,
            Self::Id(id) => id,
        }
    }

    /// The product record, if it was populated.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Embedded(product) => Some(product),
            Self::Id(_) => None,
        }
    }
}

/// A line in a shopper's cart. Quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    pub user: UserId,
    pub product: ProductRef,
    pub quantity: u32,
}

/// An entry in a shopper's wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: WishlistItemId,
    pub user: UserId,
    pub product: ProductRef,
}

/// Entries that point at a product: cart lines and wishlist items.
pub trait ProductLine {
    /// Reference to the product this entry is for.
    fn product_ref(&self) -> &ProductRef;

    /// Id of the product this entry is for.
    fn product_id(&self) -> &ProductId {
        self.product_ref().id()
    }
}

impl ProductLine for CartItem {
    fn product_ref(&self) -> &ProductRef {
        &self.product
    }
}

impl ProductLine for WishlistItem {
    fn product_ref(&self) -> &ProductRef {
        &self.product
    }
}

// =============================================================================
// Users
// =============================================================================

/// The logged-in shopper as known to the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_verified: bool,
}
