//! Product listing filters.
//!
//! A [`FilterSet`] is transient view state: the checkboxes ticked in the
//! brand and category panels, the chosen sort, and whether the viewer is an
//! admin. The whole set is sent with every listing request; there is no
//! incremental query.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId};

/// Field a listing can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Price,
}

impl SortField {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A sort specification as sent to the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub sort: SortField,
    pub order: SortOrder,
}

/// A labelled entry of the sort dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortOption {
    pub name: &'static str,
    #[serde(flatten)]
    pub spec: SortSpec,
}

/// Sort dropdown entries, in display order.
pub const SORT_OPTIONS: [SortOption; 2] = [
    SortOption {
        name: "Price: low to high",
        spec: SortSpec {
            sort: SortField::Price,
            order: SortOrder::Asc,
        },
    },
    SortOption {
        name: "Price: high to low",
        spec: SortSpec {
            sort: SortField::Price,
            order: SortOrder::Desc,
        },
    },
];

/// Which products the viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Shoppers only see products visible to users.
    #[default]
    UserVisible,
    /// Admins see every product, including hidden ones.
    All,
}

impl Scope {
    /// Scope for a viewer with the given admin flag.
    #[must_use]
    pub const fn for_admin(is_admin: bool) -> Self {
        if is_admin { Self::All } else { Self::UserVisible }
    }
}

/// A filter dimension with checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Brand,
    Category,
}

/// The selected brand and category ids, sort, and scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    pub brands: BTreeSet<BrandId>,
    pub categories: BTreeSet<CategoryId>,
    pub sort: Option<SortSpec>,
    pub scope: Scope,
}

impl FilterSet {
    /// An empty filter set for the given scope.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self {
            brands: BTreeSet::new(),
            categories: BTreeSet::new(),
            sort: None,
            scope,
        }
    }

    /// Apply a brand checkbox change.
    pub fn toggle_brand(&mut self, id: BrandId, checked: bool) {
        if checked {
            self.brands.insert(id);
        } else {
            self.brands.remove(&id);
        }
    }

    /// Apply a category checkbox change.
    pub fn toggle_category(&mut self, id: CategoryId, checked: bool) {
        if checked {
            self.categories.insert(id);
        } else {
            self.categories.remove(&id);
        }
    }

    /// Apply a checkbox change to `dimension` for the raw option value.
    pub fn toggle(&mut self, dimension: FilterDimension, value: &str, checked: bool) {
        match dimension {
            FilterDimension::Brand => self.toggle_brand(BrandId::new(value), checked),
            FilterDimension::Category => self.toggle_category(CategoryId::new(value), checked),
        }
    }

    /// Choose or clear the sort.
    pub const fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Clear selections and sort, keeping the scope.
    pub fn reset(&mut self) {
        *self = Self::new(self.scope);
    }

    /// Query-string pairs for the listing endpoint.
    ///
    /// Every selected id is sent as its own `brand=` / `category=` pair,
    /// followed by `sort` and `order`, and `user=true` for shoppers.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .brands
            .iter()
            .map(|id| ("brand", id.to_string()))
            .chain(self.categories.iter().map(|id| ("category", id.to_string())))
            .collect();

        if let Some(spec) = self.sort {
            pairs.push(("sort", spec.sort.as_str().to_string()));
            pairs.push(("order", spec.order.as_str().to_string()));
        }

        if self.scope == Scope::UserVisible {
            pairs.push(("user", "true".to_string()));
        }

        pairs
    }
}
