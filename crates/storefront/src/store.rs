//! Per-shopper state store.
//!
//! Each shopper owns one [`Store`]: the collections last fetched for them,
//! a status flag per tracked operation, their listing filters and current
//! page. Readers take an immutable [`Snapshot`]; writers replace collections
//! wholesale.
//!
//! # Request sequencing
//!
//! Every request takes a [`Ticket`] from a monotonically increasing counter.
//! A settled response is applied to its collection only if its ticket is
//! newer than the last one applied there, so a slow response can never
//! overwrite the result of a request issued after it.
//!
//! A collection can be marked stale after a refetch fails; it then counts as
//! not loaded until the next response is applied to it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use easy_kart_core::filters::FilterSet;
use easy_kart_core::notice::Notice;
use easy_kart_core::{
    Brand, CartItem, Category, Operation, Product, RequestStatus, User, UserId, WishlistItem,
};
use moka::future::Cache;

/// A collection held by the store, replaced wholesale on every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    User,
    Products,
    Catalog,
    Cart,
    Wishlist,
}

/// Immutable view of a shopper's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub user: Option<User>,
    pub products: Vec<Product>,
    /// Total matching products across all listing pages.
    pub total_results: u32,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<WishlistItem>,
    pub filters: FilterSet,
    /// Current listing page, 1-based.
    pub page: u32,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            user: None,
            products: Vec::new(),
            total_results: 0,
            categories: Vec::new(),
            brands: Vec::new(),
            cart: Vec::new(),
            wishlist: Vec::new(),
            filters: FilterSet::default(),
            page: 1,
        }
    }
}

/// Sequence number handed out when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    operation: Option<Operation>,
}

impl Ticket {
    /// Position of this request in issue order.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Default)]
struct StoreState {
    snapshot: Arc<Snapshot>,
    statuses: BTreeMap<Operation, RequestStatus>,
    /// Newest ticket issued per operation; only it may set the status.
    issued: BTreeMap<Operation, u64>,
    /// Newest ticket applied per collection.
    applied: BTreeMap<Collection, u64>,
    /// Collections known to be out of date with the remote API.
    stale: BTreeSet<Collection>,
}

/// A shopper's state. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    state: RwLock<StoreState>,
    next_ticket: AtomicU64,
}

impl Store {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_seq(&self) -> u64 {
        self.inner.next_ticket.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.read().snapshot)
    }

    /// Start a tracked request: marks `operation` pending.
    pub fn begin(&self, operation: Operation) -> Ticket {
        let seq = self.next_seq();
        let mut state = self.write();
        state.issued.insert(operation, seq);
        state.statuses.insert(operation, RequestStatus::Pending);
        Ticket {
            seq,
            operation: Some(operation),
        }
    }

    /// Start a request with no status flag.
    pub fn begin_untracked(&self) -> Ticket {
        Ticket {
            seq: self.next_seq(),
            operation: None,
        }
    }

    /// Apply a settled response to `collection`.
    ///
    /// Returns `false`, leaving the state untouched, when a newer response
    /// has already been applied there.
    pub fn apply(
        &self,
        ticket: &Ticket,
        collection: Collection,
        update: impl FnOnce(&mut Snapshot),
    ) -> bool {
        let mut state = self.write();
        if state
            .applied
            .get(&collection)
            .is_some_and(|&last| last >= ticket.seq)
        {
            tracing::debug!(
                ?collection,
                ticket = ticket.seq,
                "Discarding stale response"
            );
            return false;
        }
        state.applied.insert(collection, ticket.seq);
        state.stale.remove(&collection);
        update(Arc::make_mut(&mut state.snapshot));
        true
    }

    /// Record how a request settled.
    ///
    /// Ignored when a newer request for the same operation has started since.
    pub fn settle(&self, ticket: &Ticket, status: RequestStatus) {
        let Some(operation) = ticket.operation else {
            return;
        };
        let mut state = self.write();
        if state.issued.get(&operation) == Some(&ticket.seq) {
            state.statuses.insert(operation, status);
        }
    }

    /// Current status of `operation`.
    #[must_use]
    pub fn status(&self, operation: Operation) -> RequestStatus {
        self.read()
            .statuses
            .get(&operation)
            .copied()
            .unwrap_or_default()
    }

    /// Report the outcome of `operation` once.
    ///
    /// A settled status yields its notice (if any) and is reset to idle.
    pub fn take_notice(&self, operation: Operation) -> Option<Notice> {
        let mut state = self.write();
        let status = state.statuses.get(&operation).copied().unwrap_or_default();
        if !status.is_settled() {
            return None;
        }
        state.statuses.insert(operation, RequestStatus::Idle);
        Notice::for_outcome(operation, status)
    }

    /// Whether `collection` has been fetched and is not marked stale.
    #[must_use]
    pub fn is_loaded(&self, collection: Collection) -> bool {
        let state = self.read();
        state.applied.contains_key(&collection) && !state.stale.contains(&collection)
    }

    /// Mark `collection` out of date so the next session load refetches it.
    ///
    /// The held data stays readable, and ticket ordering is kept so older
    /// in-flight responses are still discarded.
    pub fn invalidate(&self, collection: Collection) {
        tracing::debug!(?collection, "Marking collection stale");
        self.write().stale.insert(collection);
    }

    /// Change the listing filters; the listing returns to page 1.
    pub fn update_filters(&self, update: impl FnOnce(&mut FilterSet)) -> FilterSet {
        let mut state = self.write();
        let snapshot = Arc::make_mut(&mut state.snapshot);
        update(&mut snapshot.filters);
        snapshot.page = 1;
        snapshot.filters.clone()
    }

    /// Move the listing to `page`.
    pub fn set_page(&self, page: u32) {
        let mut state = self.write();
        Arc::make_mut(&mut state.snapshot).page = page.max(1);
    }
}

// =============================================================================
// ShopperStores
// =============================================================================

/// Stores for every active shopper, dropped after a period of inactivity.
#[derive(Clone)]
pub struct ShopperStores {
    cache: Cache<UserId, Store>,
}

impl ShopperStores {
    /// Create an empty registry expiring stores idle for `idle`.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(idle)
                .build(),
        }
    }

    /// The store for `user`, created on first use.
    pub async fn get(&self, user: &UserId) -> Store {
        self.cache.get_with(user.clone(), async { Store::new() }).await
    }
}
