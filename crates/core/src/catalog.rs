//! Category groups and product partitioning for the landing page sections.
//!
//! A group is a fixed set of category *names*. Names are resolved against
//! the fetched category collection to ids, and products are then filtered
//! by category id. Categories outside every group appear in no section.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{Category, CategoryId, Product};

/// A display section defined by a fixed set of category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    /// Stable machine key.
    pub key: &'static str,
    /// Section heading.
    pub label: &'static str,
    /// Category names belonging to this group (exact, case-sensitive).
    pub names: &'static [&'static str],
}

/// The landing page sections, in display order.
pub const CATEGORY_GROUPS: &[CategoryGroup] = &[
    CategoryGroup {
        key: "electronics",
        label: "Electronics",
        names: &["smartphones", "laptops", "mens-watches", "womens-watches"],
    },
    CategoryGroup {
        key: "fashion_and_accessories",
        label: "Fashion & Accessories",
        names: &[
            "tops",
            "womens-dresses",
            "sunglasses",
            "womens-shoes",
            "womens-bags",
            "womens-jewellery",
            "mens-shirts",
            "mens-shoes",
        ],
    },
    CategoryGroup {
        key: "home_and_living",
        label: "Home & Living",
        names: &["lighting", "home-decoration", "furniture", "groceries"],
    },
    CategoryGroup {
        key: "beauty_and_personal_care",
        label: "Beauty & Personal Care",
        names: &["fragrances", "skincare"],
    },
    CategoryGroup {
        key: "automotive_and_outdoors",
        label: "Automotive & Outdoors",
        names: &["automotive", "motorcycle"],
    },
];

/// Ids of every category whose name is one of `group_names`.
///
/// If several categories share a matching name, all of their ids are
/// included.
#[must_use]
pub fn ids_for_group(categories: &[Category], group_names: &[&str]) -> BTreeSet<CategoryId> {
    categories
        .iter()
        .filter(|category| group_names.contains(&category.name.as_str()))
        .map(|category| category.id.clone())
        .collect()
}

/// Products whose category is in `ids`, in source order.
#[must_use]
pub fn products_in_group<'a>(
    products: &'a [Product],
    ids: &BTreeSet<CategoryId>,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| ids.contains(&product.category))
        .collect()
}

/// A resolved group: its category ids and the products that fall in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSection<'a> {
    pub key: &'static str,
    pub label: &'static str,
    pub category_ids: BTreeSet<CategoryId>,
    pub products: Vec<&'a Product>,
}

/// Resolve every group in `groups` against the current collections.
#[must_use]
pub fn group_sections<'a>(
    categories: &[Category],
    products: &'a [Product],
    groups: &[CategoryGroup],
) -> Vec<GroupSection<'a>> {
    groups
        .iter()
        .map(|group| {
            let category_ids = ids_for_group(categories, group.names);
            let products = products_in_group(products, &category_ids);
            GroupSection {
                key: group.key,
                label: group.label,
                category_ids,
                products,
            }
        })
        .collect()
}
