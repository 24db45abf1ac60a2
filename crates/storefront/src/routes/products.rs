//! Product listing and filter route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use easy_kart_core::catalog::{CATEGORY_GROUPS, group_sections};
use easy_kart_core::filters::{FilterDimension, FilterSet, SORT_OPTIONS, SortOption, SortSpec};
use easy_kart_core::membership::Membership;
use easy_kart_core::notice::Notice;
use easy_kart_core::pagination::PageWindow;
use easy_kart_core::stock::StockHint;
use easy_kart_core::{
    Brand, Category, CategoryId, Operation, Price, Product, ProductId, RequestStatus,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::open_session;
use crate::dispatch::Dispatcher;
use crate::error::{AppError, Result};
use crate::middleware::Shopper;
use crate::state::AppState;
use crate::store::Snapshot;

/// Product card display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCardView {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub price_label: String,
    pub thumbnail: Option<String>,
    pub brand: Option<String>,
    pub category: CategoryId,
    pub stock_quantity: u32,
    pub stock_hint: Option<&'static str>,
    pub is_deleted: bool,
    #[serde(flatten)]
    pub membership: Membership,
}

impl ProductCardView {
    /// Card for `product` with membership in the shopper's collections.
    #[must_use]
    pub fn new(product: &Product, snapshot: &Snapshot) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            price_label: product.price.to_string(),
            thumbnail: product.thumbnail.clone(),
            brand: product.brand.name().map(String::from),
            category: product.category.clone(),
            stock_quantity: product.stock_quantity,
            stock_hint: StockHint::for_quantity(product.stock_quantity).map(StockHint::message),
            is_deleted: product.is_deleted,
            membership: Membership::of(&product.id, &snapshot.cart, &snapshot.wishlist),
        }
    }
}

/// A category group section on the home page.
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub key: &'static str,
    pub label: &'static str,
    pub products: Vec<ProductCardView>,
}

/// Listing page data.
#[derive(Debug, Serialize)]
pub struct ListingView {
    /// Products on the current page.
    pub products: Vec<ProductCardView>,
    pub sections: Vec<SectionView>,
    pub filters: FilterSet,
    pub sort_options: &'static [SortOption],
    pub page: PageWindow,
    pub summary: String,
    pub status: RequestStatus,
    pub notice: Option<Notice>,
}

impl ListingView {
    /// Build the listing for the shopper's current state.
    #[must_use]
    pub fn build(
        snapshot: &Snapshot,
        per_page: u32,
        notice: Option<Notice>,
        status: RequestStatus,
    ) -> Self {
        let page = PageWindow::new(snapshot.page, snapshot.total_results, per_page);
        let skip = usize::try_from(page.page.saturating_sub(1).saturating_mul(per_page))
            .unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);

        let products = snapshot
            .products
            .iter()
            .skip(skip)
            .take(take)
            .map(|product| ProductCardView::new(product, snapshot))
            .collect();

        let sections = group_sections(&snapshot.categories, &snapshot.products, CATEGORY_GROUPS)
            .into_iter()
            .map(|section| SectionView {
                key: section.key,
                label: section.label,
                products: section
                    .products
                    .into_iter()
                    .map(|product| ProductCardView::new(product, snapshot))
                    .collect(),
            })
            .collect();

        Self {
            products,
            sections,
            filters: snapshot.filters.clone(),
            sort_options: &SORT_OPTIONS,
            summary: page.summary(),
            page,
            status,
            notice,
        }
    }
}

/// Brands and categories for the filter panels.
#[derive(Debug, Serialize)]
pub struct CatalogFiltersView {
    pub brands: Vec<Brand>,
    pub categories: Vec<Category>,
    pub selected: FilterSet,
    pub sort_options: &'static [SortOption],
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
}

/// A filter checkbox change.
#[derive(Debug, Deserialize)]
pub struct FilterToggle {
    pub id: String,
    pub checked: bool,
}

fn listing(state: &AppState, dispatcher: &Dispatcher) -> Json<ListingView> {
    let store = dispatcher.store();
    let notice = store.take_notice(Operation::ProductFetch);
    Json(ListingView::build(
        &store.snapshot(),
        state.config().items_per_page,
        notice,
        store.status(Operation::ProductFetch),
    ))
}

/// Product listing with group sections and membership flags.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Query(query): Query<ListingQuery>,
) -> Json<ListingView> {
    let dispatcher = open_session(&state, user).await;
    if let Some(page) = query.page {
        dispatcher.store().set_page(page);
    }
    listing(&state, &dispatcher)
}

/// Check or uncheck a brand or category filter, then refetch the listing.
#[instrument(skip(state, toggle), fields(id = %toggle.id, checked = toggle.checked))]
pub async fn toggle_filter(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Path(dimension): Path<FilterDimension>,
    Json(toggle): Json<FilterToggle>,
) -> Result<Json<ListingView>> {
    if toggle.id.trim().is_empty() {
        return Err(AppError::BadRequest("filter id must not be empty".to_string()));
    }

    let dispatcher = open_session(&state, user).await;
    dispatcher
        .store()
        .update_filters(|filters| filters.toggle(dimension, &toggle.id, toggle.checked));
    dispatcher.refresh_products().await;

    Ok(listing(&state, &dispatcher))
}

/// Choose or clear the listing sort, then refetch the listing.
#[instrument(skip(state))]
pub async fn set_sort(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Json(sort): Json<Option<SortSpec>>,
) -> Json<ListingView> {
    let dispatcher = open_session(&state, user).await;
    dispatcher
        .store()
        .update_filters(|filters| filters.set_sort(sort));
    dispatcher.refresh_products().await;

    listing(&state, &dispatcher)
}

/// Clear every filter and the sort, then refetch the listing.
#[instrument(skip(state))]
pub async fn reset_filters(
    State(state): State<AppState>,
    Shopper(user): Shopper,
) -> Json<ListingView> {
    let dispatcher = open_session(&state, user).await;
    dispatcher.store().update_filters(FilterSet::reset);
    dispatcher.refresh_products().await;

    listing(&state, &dispatcher)
}

/// Brands and categories for the filter panels.
#[instrument(skip(state))]
pub async fn catalog_filters(
    State(state): State<AppState>,
    Shopper(user): Shopper,
) -> Json<CatalogFiltersView> {
    let dispatcher = open_session(&state, user).await;
    let snapshot = dispatcher.store().snapshot();

    Json(CatalogFiltersView {
        brands: snapshot.brands.clone(),
        categories: snapshot.categories.clone(),
        selected: snapshot.filters.clone(),
        sort_options: &SORT_OPTIONS,
    })
}
