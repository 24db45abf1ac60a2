//! HTTP route handlers for storefront.
//!
//! Every route except `/health` requires the `x-user-id` header and answers
//! with JSON.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                     - Health check
//!
//! # Products
//! GET    /products                   - Listing, group sections, page window
//! POST   /products/filters/{dimension} - Check/uncheck a brand or category
//! POST   /products/sort              - Choose or clear the sort
//! DELETE /products/filters           - Reset filters and sort
//! GET    /catalog/filters            - Brands and categories for the filter panels
//!
//! # Cart
//! GET    /cart                       - Cart lines and totals
//! POST   /cart                       - Add a product
//! POST   /cart/{id}/increment        - One more unit
//! POST   /cart/{id}/decrement        - One fewer unit, removing the last
//! DELETE /cart/{id}                  - Remove a line
//!
//! # Wishlist
//! GET    /wishlist                   - Wishlist entries
//! POST   /wishlist                   - Check/uncheck a product
//!
//! # Account
//! GET    /nav                        - Navbar badges and user menu
//! POST   /account/admin-mode         - Toggle the admin flag
//! ```

pub mod account;
pub mod cart;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post},
};
use easy_kart_core::UserId;

use crate::dispatch::Dispatcher;
use crate::state::AppState;

/// A dispatcher for `user` with every collection loaded at least once.
async fn open_session(state: &AppState, user: UserId) -> Dispatcher {
    let dispatcher = state.dispatcher(user).await;
    dispatcher.ensure_session().await;
    dispatcher
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/filters", delete(products::reset_filters))
        .route("/filters/{dimension}", post(products::toggle_filter))
        .route("/sort", post(products::set_sort))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{id}", delete(cart::remove))
        .route("/{id}/increment", post(cart::increment))
        .route("/{id}/decrement", post(cart::decrement))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new().route("/", get(wishlist::show).post(wishlist::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/catalog/filters", get(products::catalog_filters))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/nav", get(account::nav))
        .route("/account/admin-mode", post(account::toggle_admin_mode))
}
