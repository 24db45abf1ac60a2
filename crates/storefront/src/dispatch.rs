//! Runs shopper actions against the remote API and folds results into the store.
//!
//! Every action marks its operation pending, awaits the API, then settles
//! it as fulfilled or rejected. Successful mutations are followed by a
//! wholesale refetch of the affected collection. Failures are logged and
//! leave the previous snapshot in place; they are never raised to callers.

use easy_kart_core::commands::{CartCommand, WishlistCommand};
use easy_kart_core::filters::Scope;
use easy_kart_core::{Operation, RequestStatus, UserId};
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::error::add_breadcrumb;
use crate::store::{Collection, Store, Ticket};

/// Executes actions for one shopper.
#[derive(Clone)]
pub struct Dispatcher {
    api: ApiClient,
    store: Store,
    user: UserId,
}

impl Dispatcher {
    /// Create a dispatcher acting as `user` on `store`.
    #[must_use]
    pub const fn new(api: ApiClient, store: Store, user: UserId) -> Self {
        Self { api, store, user }
    }

    /// The shopper's store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The shopper this dispatcher acts for.
    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Fetch whatever this shopper has not loaded yet.
    ///
    /// The user comes first since the admin flag decides the listing scope.
    pub async fn ensure_session(&self) {
        if !self.store.is_loaded(Collection::User) {
            self.load_user().await;
        }

        let catalog = async {
            if !self.store.is_loaded(Collection::Catalog) {
                self.refresh_catalog().await;
            }
        };
        let cart = async {
            if !self.store.is_loaded(Collection::Cart) {
                self.refresh_cart().await;
            }
        };
        let wishlist = async {
            if !self.store.is_loaded(Collection::Wishlist) {
                self.refresh_wishlist().await;
            }
        };
        let products = async {
            if !self.store.is_loaded(Collection::Products) {
                self.refresh_products().await;
            }
        };
        tokio::join!(catalog, cart, wishlist, products);
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    /// Fetch the shopper's user record and derive the listing scope from it.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn load_user(&self) -> RequestStatus {
        let ticket = self.store.begin(Operation::UserFetch);
        let result = self.api.fetch_user(&self.user).await;
        self.settle(&ticket, "fetch user", result, |store, ticket, user| {
            store.apply(ticket, Collection::User, |snapshot| {
                snapshot.filters.scope = Scope::for_admin(user.is_admin);
                snapshot.user = Some(user);
            });
        })
    }

    /// Fetch categories and brands.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn refresh_catalog(&self) -> RequestStatus {
        let ticket = self.store.begin_untracked();
        let result = tokio::try_join!(self.api.fetch_categories(), self.api.fetch_brands());
        self.settle(&ticket, "fetch catalog", result, |store, ticket, (categories, brands)| {
            store.apply(ticket, Collection::Catalog, |snapshot| {
                snapshot.categories = categories;
                snapshot.brands = brands;
            });
        })
    }

    /// Fetch the listing for the current filters.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn refresh_products(&self) -> RequestStatus {
        let ticket = self.store.begin(Operation::ProductFetch);
        let filters = self.store.snapshot().filters.clone();
        let result = self.api.fetch_products(&filters).await;
        self.settle(&ticket, "fetch products", result, |store, ticket, page| {
            store.apply(ticket, Collection::Products, |snapshot| {
                snapshot.products = page.products;
                snapshot.total_results = page.total_results;
            });
        })
    }

    /// Fetch the shopper's cart.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn refresh_cart(&self) -> RequestStatus {
        let ticket = self.store.begin(Operation::CartFetch);
        let result = self.api.fetch_cart(&self.user).await;
        self.settle(&ticket, "fetch cart", result, |store, ticket, items| {
            store.apply(ticket, Collection::Cart, |snapshot| snapshot.cart = items);
        })
    }

    /// Fetch the shopper's wishlist.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn refresh_wishlist(&self) -> RequestStatus {
        let ticket = self.store.begin(Operation::WishlistFetch);
        let result = self.api.fetch_wishlist(&self.user).await;
        self.settle(&ticket, "fetch wishlist", result, |store, ticket, items| {
            store.apply(ticket, Collection::Wishlist, |snapshot| {
                snapshot.wishlist = items;
            });
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Run a cart mutation, then refetch the cart.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn cart(&self, command: CartCommand) -> RequestStatus {
        let (ticket, result) = match &command {
            CartCommand::Add(item) => {
                add_breadcrumb("cart", "Added product", &[("product", item.product.as_str())]);
                let ticket = self.store.begin(Operation::CartAdd);
                (ticket, self.api.add_to_cart(item).await)
            }
            CartCommand::Update { id, quantity } => {
                let ticket = self.store.begin(Operation::CartUpdate);
                (ticket, self.api.update_cart_item(id, *quantity).await)
            }
            CartCommand::Remove { id } => {
                add_breadcrumb("cart", "Removed line", &[("item", id.as_str())]);
                let ticket = self.store.begin(Operation::CartRemove);
                (ticket, self.api.remove_cart_item(id).await)
            }
        };

        let status = self.settle(&ticket, "update cart", result, |_, _, ()| {});
        if status == RequestStatus::Fulfilled {
            self.resync(Collection::Cart).await;
        }
        status
    }

    /// Run a wishlist mutation, then refetch the wishlist.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn wishlist(&self, command: WishlistCommand) -> RequestStatus {
        let (ticket, result) = match &command {
            WishlistCommand::Add(item) => {
                let ticket = self.store.begin(Operation::WishlistAdd);
                (ticket, self.api.add_to_wishlist(item).await)
            }
            WishlistCommand::Remove { id } => {
                let ticket = self.store.begin(Operation::WishlistRemove);
                (ticket, self.api.remove_wishlist_item(id).await)
            }
        };

        let status = self.settle(&ticket, "update wishlist", result, |_, _, ()| {});
        if status == RequestStatus::Fulfilled {
            self.resync(Collection::Wishlist).await;
        }
        status
    }

    /// Flip the shopper's admin flag, then refetch the user and the listing
    /// whose scope depends on it.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn toggle_admin(&self) -> RequestStatus {
        if !self.store.is_loaded(Collection::User) {
            self.load_user().await;
        }
        let Some(is_admin) = self.store.snapshot().user.as_ref().map(|u| u.is_admin) else {
            // Nothing to toggle without a user record
            let ticket = self.store.begin(Operation::UserUpdate);
            self.store.settle(&ticket, RequestStatus::Rejected);
            return RequestStatus::Rejected;
        };

        let ticket = self.store.begin(Operation::UserUpdate);
        let result = self.api.update_admin(&self.user, !is_admin).await;
        let status = self.settle(&ticket, "toggle admin mode", result, |_, _, ()| {});
        if status == RequestStatus::Fulfilled {
            self.resync(Collection::User).await;
            self.resync(Collection::Products).await;
        }
        status
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Refetch `collection` after a successful mutation.
    ///
    /// The remote state has moved on, so a failed refetch leaves the
    /// collection stale and the next session load retries it.
    async fn resync(&self, collection: Collection) {
        let status = match collection {
            Collection::User => self.load_user().await,
            Collection::Products => self.refresh_products().await,
            Collection::Catalog => self.refresh_catalog().await,
            Collection::Cart => self.refresh_cart().await,
            Collection::Wishlist => self.refresh_wishlist().await,
        };
        if status != RequestStatus::Fulfilled {
            self.store.invalidate(collection);
        }
    }

    /// Settle `ticket` from `result`, applying the value on success.
    fn settle<T>(
        &self,
        ticket: &Ticket,
        what: &str,
        result: Result<T, ApiError>,
        on_success: impl FnOnce(&Store, &Ticket, T),
    ) -> RequestStatus {
        let status = match result {
            Ok(value) => {
                on_success(&self.store, ticket, value);
                RequestStatus::Fulfilled
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user = %self.user,
                    ticket = ticket.seq(),
                    "Failed to {what}"
                );
                RequestStatus::Rejected
            }
        };
        self.store.settle(ticket, status);
        status
    }
}
