//! Wishlist route handlers.

use axum::{Json, extract::State};
use easy_kart_core::commands::WishlistCommand;
use easy_kart_core::membership::is_member;
use easy_kart_core::notice::Notice;
use easy_kart_core::{Operation, Price, ProductId, RequestStatus, WishlistItem, WishlistItemId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::open_session;
use crate::dispatch::Dispatcher;
use crate::middleware::Shopper;
use crate::state::AppState;
use crate::store::Snapshot;

/// Wishlist entry display data.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistEntryView {
    pub id: WishlistItemId,
    pub product: ProductId,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub price: Option<Price>,
    pub in_cart: bool,
}

impl WishlistEntryView {
    fn new(item: &WishlistItem, snapshot: &Snapshot) -> Self {
        let id = item.product.id();
        let product = item
            .product
            .product()
            .or_else(|| snapshot.products.iter().find(|p| &p.id == id));

        Self {
            id: item.id.clone(),
            product: id.clone(),
            title: product.map(|p| p.title.clone()),
            thumbnail: product.and_then(|p| p.thumbnail.clone()),
            price: product.map(|p| p.price),
            in_cart: is_member(&snapshot.cart, id),
        }
    }
}

/// Wishlist display data.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<WishlistEntryView>,
    pub status: RequestStatus,
    pub notice: Option<Notice>,
}

/// Wishlist heart change.
#[derive(Debug, Deserialize)]
pub struct WishlistToggle {
    pub product: ProductId,
    pub checked: bool,
}

fn wishlist_view(dispatcher: &Dispatcher, operation: Option<Operation>) -> Json<WishlistView> {
    let store = dispatcher.store();
    let notice = operation
        .and_then(|op| store.take_notice(op))
        .or_else(|| store.take_notice(Operation::WishlistFetch));
    let snapshot = store.snapshot();

    Json(WishlistView {
        items: snapshot
            .wishlist
            .iter()
            .map(|item| WishlistEntryView::new(item, &snapshot))
            .collect(),
        status: store.status(Operation::WishlistFetch),
        notice,
    })
}

/// The shopper's wishlist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Shopper(user): Shopper) -> Json<WishlistView> {
    let dispatcher = open_session(&state, user).await;
    wishlist_view(&dispatcher, None)
}

/// Check or uncheck a product's wishlist heart.
///
/// Checking a wishlisted product or unchecking one that is not wishlisted
/// changes nothing.
#[instrument(skip(state))]
pub async fn toggle(
    State(state): State<AppState>,
    Shopper(user): Shopper,
    Json(body): Json<WishlistToggle>,
) -> Json<WishlistView> {
    let dispatcher = open_session(&state, user).await;
    let snapshot = dispatcher.store().snapshot();

    let Some(command) =
        WishlistCommand::toggle(&snapshot.wishlist, dispatcher.user(), &body.product, body.checked)
    else {
        tracing::debug!(
            product = %body.product,
            checked = body.checked,
            "Wishlist already in requested state"
        );
        return wishlist_view(&dispatcher, None);
    };

    let operation = match command {
        WishlistCommand::Add(_) => Operation::WishlistAdd,
        WishlistCommand::Remove { .. } => Operation::WishlistRemove,
    };
    dispatcher.wishlist(command).await;
    wishlist_view(&dispatcher, Some(operation))
}
