//! Transient notifications for settled requests.

use serde::Serialize;

use crate::types::{Operation, RequestStatus};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A one-shot message describing how a request settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: &'static str,
}

impl Notice {
    const fn success(message: &'static str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message,
        }
    }

    const fn error(message: &'static str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }

    /// The notice to show for `operation` settling with `status`.
    ///
    /// Background fetches only report failures. Pending and idle requests
    /// never produce a notice.
    #[must_use]
    pub const fn for_outcome(operation: Operation, status: RequestStatus) -> Option<Self> {
        let notice = match (operation, status) {
            (Operation::CartAdd, RequestStatus::Fulfilled) => {
                Self::success("Product added to cart")
            }
            (Operation::CartAdd, RequestStatus::Rejected) => {
                Self::error("Error adding product to cart, please try again later")
            }
            (Operation::CartUpdate, RequestStatus::Rejected) => {
                Self::error("Error updating cart item, please try again later")
            }
            (Operation::CartRemove, RequestStatus::Fulfilled) => {
                Self::success("Product removed from cart")
            }
            (Operation::CartRemove, RequestStatus::Rejected) => {
                Self::error("Error removing product from cart, please try again later")
            }
            (Operation::WishlistAdd, RequestStatus::Fulfilled) => {
                Self::success("Product added to wishlist")
            }
            (Operation::WishlistAdd, RequestStatus::Rejected) => {
                Self::error("Error adding product to wishlist, please try again later")
            }
            (Operation::WishlistRemove, RequestStatus::Fulfilled) => {
                Self::success("Product removed from wishlist")
            }
            (Operation::WishlistRemove, RequestStatus::Rejected) => {
                Self::error("Error removing product from wishlist, please try again later")
            }
            (Operation::ProductFetch, RequestStatus::Rejected) => {
                Self::error("Error fetching products, please try again later")
            }
            (Operation::CartFetch, RequestStatus::Rejected) => {
                Self::error("Error fetching cart items, please try again later")
            }
            (Operation::WishlistFetch, RequestStatus::Rejected) => {
                Self::error("Error fetching wishlist, please try again later")
            }
            (Operation::UserUpdate, RequestStatus::Rejected) => {
                Self::error("Failed to toggle admin status")
            }
            _ => return None,
        };
        Some(notice)
    }
}
