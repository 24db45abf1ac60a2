//! Application state shared across handlers.

use std::sync::Arc;

use easy_kart_core::UserId;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::dispatch::Dispatcher;
use crate::store::ShopperStores;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the API client and the shopper stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    shoppers: ShopperStores,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config.api);
        let shoppers = ShopperStores::new(config.session_idle);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                shoppers,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// A dispatcher acting for `user` on their store.
    pub async fn dispatcher(&self, user: UserId) -> Dispatcher {
        let store = self.inner.shoppers.get(&user).await;
        Dispatcher::new(self.inner.api.clone(), store, user)
    }
}
