//! Navbar and account route handlers.

use axum::{Json, extract::State};
use easy_kart_core::navigation::{NavBar, admin_mode_landing};
use easy_kart_core::notice::Notice;
use easy_kart_core::{Operation, RequestStatus};
use serde::Serialize;
use tracing::instrument;

use super::open_session;
use crate::middleware::Shopper;
use crate::state::AppState;

/// Result of switching admin mode.
#[derive(Debug, Serialize)]
pub struct AdminModeView {
    pub is_admin: bool,
    /// Where to navigate after a successful switch.
    pub landing: Option<&'static str>,
    pub status: RequestStatus,
    pub notice: Option<Notice>,
}

/// Navbar badges, greeting and user menu.
#[instrument(skip(state))]
pub async fn nav(State(state): State<AppState>, Shopper(user): Shopper) -> Json<NavBar> {
    let dispatcher = open_session(&state, user).await;
    let snapshot = dispatcher.store().snapshot();

    Json(NavBar::new(
        snapshot.user.as_ref(),
        &snapshot.cart,
        &snapshot.wishlist,
    ))
}

/// Flip the shopper's admin flag.
#[instrument(skip(state))]
pub async fn toggle_admin_mode(
    State(state): State<AppState>,
    Shopper(user): Shopper,
) -> Json<AdminModeView> {
    let dispatcher = open_session(&state, user).await;

    let status = dispatcher.toggle_admin().await;
    let is_admin = dispatcher
        .store()
        .snapshot()
        .user
        .as_ref()
        .is_some_and(|u| u.is_admin);

    Json(AdminModeView {
        is_admin,
        landing: (status == RequestStatus::Fulfilled).then(|| admin_mode_landing(is_admin)),
        status,
        notice: dispatcher.store().take_notice(Operation::UserUpdate),
    })
}
