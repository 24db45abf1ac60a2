//! Cache types for reference data served by the remote API.

use easy_kart_core::{Brand, Category};

/// Cache key for reference collections.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    Brands,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Brands(Vec<Brand>),
}
