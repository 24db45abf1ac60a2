//! Request status flags.
//!
//! Each tracked remote request moves `Idle -> Pending -> Fulfilled | Rejected`
//! and is reset to `Idle` once the outcome has been reported to the shopper.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single tracked request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

impl RequestStatus {
    /// Whether the request has completed, successfully or not.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }
}

/// Remote operations whose status is tracked by the shopper store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ProductFetch,
    CartFetch,
    CartAdd,
    CartUpdate,
    CartRemove,
    WishlistFetch,
    WishlistAdd,
    WishlistRemove,
    UserFetch,
    UserUpdate,
}

impl Operation {
    /// Every tracked operation, in a stable order.
    pub const ALL: [Self; 10] = [
        Self::ProductFetch,
        Self::CartFetch,
        Self::CartAdd,
        Self::CartUpdate,
        Self::CartRemove,
        Self::WishlistFetch,
        Self::WishlistAdd,
        Self::WishlistRemove,
        Self::UserFetch,
        Self::UserUpdate,
    ];
}
