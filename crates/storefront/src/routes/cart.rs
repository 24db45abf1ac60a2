//! Cart route handlers.
//!
//! Every mutation is followed by a wholesale refetch of the cart; the
//! response carries the refreshed lines, totals and a one-shot notice.

use axum::{
    Json,
    extract::{Path, State},
};
use easy_kart_core::commands::CartCommand;
use easy_kart_core::membership::is_member;
use easy_kart_core::notice::Notice;
use easy_kart_core::totals::{CartTotals, Charges};
use easy_kart_core::{CartItem, CartItemId, Operation, Price, Product, ProductId, RequestStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::open_session;
use crate::dispatch::Dispatcher;
use crate::error::{AppError, Result};
use crate::middleware::Shopper;
use crate::state::AppState;
use crate::store::Snapshot;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: CartItemId,
    pub product: ProductId,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub quantity: u32,
    /// `None` when the product could not be resolved.
    pub unit_price: Option<Price>,
    pub line_total: Option<Price>,
}

impl CartLineView {
    fn new(item: &CartItem, catalog: &[Product]) -> Self {
        let product = item.product.product().or_else(|| {
            let id = item.product.id();
            catalog.iter().find(|product| &product.id == id)
        });

        Self {
            id: item.id.clone(),
            product: item.product.id().clone(),
            title: product.map(|p| p.title.clone()),
            thumbnail: product.and_then(|p| p.thumbnail.clone()),
            quantity: item.quantity,
            unit_price: product.map(|p| p.price),
            line_total: product.map(|p| p.price.times(item.quantity)),
        }
    }
}

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub totals: CartTotals,
    pub status: RequestStatus,
    pub notice: Option<Notice>,
}

impl CartView {
    /// Build the cart view from the shopper's state.
    #[must_use]
    pub fn build(
        snapshot: &Snapshot,
        charges: Charges,
        status: RequestStatus,
        notice: Option<Notice>,
    ) -> Self {
        Self {
            lines: snapshot
                .cart
                .iter()
                .map(|item| CartLineView::new(item, &snapshot.products))
                .collect(),
            totals: CartTotals::compute(&snapshot.cart, &snapshot.products, charges),
            status,
            notice,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product: ProductId,
}

/// Cart view reporting `operation`, falling back to a failed refetch.
fn cart_view(
    state: &AppState,
    dispatcher: &Dispatcher,
    operation: Option<Operation>,
) -> Json<CartView> {
    let store = dispatcher.store();
    let notice = operation
        .and_then(|op| store.take_notice(op))
        .or_else(|| store.take_notice(Operation::CartFetch));

    Json(CartView::build(
        &store.snapshot(),
        state.config().charges,
        store.status(Operation::CartFetch),
        notice,
    ))
}

/// Look up a line of the shopper's cart.
fn find_line(dispatcher: &Dispatcher, id: &CartItemId) -> Result<CartItem> {
    dispatcher
        .store()
        .snapshot()
        .cart
        .iter()
        .find(|item| &item.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("cart item {id}")))
}

/// Cart lines and totals.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Shopper(user): Shopper) -> Json<CartView> {
    let dispatcher = open_session(&state, user).await;
    cart_view(&state, &dispatcher, None)
}

/// Add a product to the cart.
///
/// A product already in the cart is left as is; quantity changes go
/// through increment and decrement.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Json(body): Json<AddToCart>,
) -> Json<CartView> {
    let dispatcher = open_session(&state, user.clone()).await;

    if is_member(&dispatcher.store().snapshot().cart, &body.product) {
        tracing::debug!(product = %body.product, "Product already in cart");
        return cart_view(&state, &dispatcher, None);
    }

    dispatcher.cart(CartCommand::add(user, body.product)).await;
    cart_view(&state, &dispatcher, Some(Operation::CartAdd))
}

/// One more unit of a cart line.
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let dispatcher = open_session(&state, user).await;
    let item = find_line(&dispatcher, &id)?;

    dispatcher.cart(CartCommand::increment(&item)).await;
    Ok(cart_view(&state, &dispatcher, Some(Operation::CartUpdate)))
}

/// One fewer unit of a cart line; the last unit removes it.
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let dispatcher = open_session(&state, user).await;
    let item = find_line(&dispatcher, &id)?;

    let command = CartCommand::decrement(&item);
    let operation = match command {
        CartCommand::Remove { .. } => Operation::CartRemove,
        CartCommand::Add(_) | CartCommand::Update { .. } => Operation::CartUpdate,
    };
    dispatcher.cart(command).await;
    Ok(cart_view(&state, &dispatcher, Some(operation)))
}

/// Remove a cart line regardless of quantity.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartView>> {
    let dispatcher = open_session(&state, user).await;
    let item = find_line(&dispatcher, &id)?;

    dispatcher.cart(CartCommand::remove(&item)).await;
    Ok(cart_view(&state, &dispatcher, Some(Operation::CartRemove)))
}
