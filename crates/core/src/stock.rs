//! Low-stock hints on product cards.

use serde::Serialize;

/// Stock at or below this level shows a hint.
pub const LOW_STOCK_THRESHOLD: u32 = 20;

/// Hint shown under a product's price when stock is running low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockHint {
    LastOne,
    FewLeft,
}

impl StockHint {
    /// Hint for a product with `stock_quantity` units left, if any.
    #[must_use]
    pub const fn for_quantity(stock_quantity: u32) -> Option<Self> {
        match stock_quantity {
            1 => Some(Self::LastOne),
            q if q <= LOW_STOCK_THRESHOLD => Some(Self::FewLeft),
            _ => None,
        }
    }

    /// Display text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::LastOne => "Only 1 stock is left",
            Self::FewLeft => "Only few are left",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_hints() {
        assert_eq!(StockHint::for_quantity(1), Some(StockHint::LastOne));
        assert_eq!(StockHint::for_quantity(0), Some(StockHint::FewLeft));
        assert_eq!(StockHint::for_quantity(20), Some(StockHint::FewLeft));
        assert_eq!(StockHint::for_quantity(21), None);
    }

    #[test]
    fn test_stock_hint_messages() {
        assert_eq!(StockHint::LastOne.message(), "Only 1 stock is left");
        assert_eq!(StockHint::FewLeft.message(), "Only few are left");
    }
}
