//! Navbar badges and user menu.

use serde::Serialize;

use crate::types::{CartItem, User, WishlistItem};

/// A user menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuLink {
    pub name: &'static str,
    pub to: &'static str,
}

/// Everything the navbar needs for the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavBar {
    pub greeting: Option<String>,
    pub is_admin: bool,
    /// Number of cart lines; hidden for admins and for an empty cart.
    pub cart_badge: Option<usize>,
    /// Number of wishlist entries; hidden for admins.
    pub wishlist_badge: Option<usize>,
    pub menu: Vec<MenuLink>,
}

impl NavBar {
    /// Build the navbar for `user` with their current collections.
    #[must_use]
    pub fn new(user: Option<&User>, cart: &[CartItem], wishlist: &[WishlistItem]) -> Self {
        let is_admin = user.is_some_and(|u| u.is_admin);
        let badges_visible = user.is_some() && !is_admin;

        Self {
            greeting: user.map(|u| format!("Hey👋, {}", u.name)),
            is_admin,
            cart_badge: (badges_visible && !cart.is_empty()).then_some(cart.len()),
            wishlist_badge: badges_visible.then_some(wishlist.len()),
            menu: menu_links(is_admin),
        }
    }
}

/// User menu entries. Admins get an extra "Add new Product" entry and
/// admin targets for profile and orders.
#[must_use]
pub fn menu_links(is_admin: bool) -> Vec<MenuLink> {
    let (profile, orders_name, orders) = if is_admin {
        ("/admin/profile", "Orders", "/admin/orders")
    } else {
        ("/profile", "My orders", "/orders")
    };

    let mut links = Vec::with_capacity(5);
    if is_admin {
        links.push(MenuLink {
            name: "Add new Product",
            to: "/admin/add-product",
        });
    }
    links.extend([
        MenuLink { name: "Home", to: "/" },
        MenuLink {
            name: "Profile",
            to: profile,
        },
        MenuLink {
            name: orders_name,
            to: orders,
        },
        MenuLink {
            name: "Logout",
            to: "/logout",
        },
    ]);
    links
}

/// Where to land after switching admin mode.
#[must_use]
pub const fn admin_mode_landing(is_admin: bool) -> &'static str {
    if is_admin { "/admin/dashboard" } else { "/" }
}
