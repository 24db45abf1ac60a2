//! Client for the remote catalog, cart and wishlist API.
//!
//! # Architecture
//!
//! - The remote API is the source of truth; nothing is persisted locally
//! - Every call is a plain JSON request over `reqwest`
//! - Categories and brands are cached in memory via `moka` (TTL from config)
//! - Mutations discard the response body; callers refetch the affected
//!   collection wholesale
//!
//! # Example
//!
//! ```rust,ignore
//! use easy_kart_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api);
//! let page = client.fetch_products(&FilterSet::default()).await?;
//! let cart = client.fetch_cart(&user_id).await?;
//! ```

mod cache;

use std::sync::Arc;

use easy_kart_core::commands::{NewLineItem, QuantityUpdate};
use easy_kart_core::filters::FilterSet;
use easy_kart_core::{
    Brand, CartItem, CartItemId, Category, Product, User, UserId, WishlistItem, WishlistItemId,
};
use moka::future::Cache;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// Header carrying the unpaginated result count of a listing.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry path segments.
    #[error("API base URL cannot be a base")]
    BaseUrl,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// One page of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total matching products across all pages.
    pub total_results: u32,
}

/// Payload for switching a user's admin flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUpdate {
    is_admin: bool,
}

/// Raw response: headers plus body text.
struct RawResponse {
    headers: HeaderMap,
    body: String,
}

impl RawResponse {
    fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&self.body, 500),
                "Failed to parse API response"
            );
            ApiError::Decode(e)
        })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the remote storefront API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        }
    }

    /// Build the URL for `segments` under the base URL, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::BaseUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<RawResponse, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(response.url().path().to_string()));
        }

        let headers = response.headers().clone();
        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, 500),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate(&body, 200),
            });
        }

        Ok(RawResponse { headers, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        self.execute(self.request(Method::GET, url)).await?.decode()
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        self.execute(self.request(method, url).json(body)).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product listing matching `filters`.
    ///
    /// The total is read from the `X-Total-Count` header, falling back to the
    /// number of products returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self, filters))]
    pub async fn fetch_products(&self, filters: &FilterSet) -> Result<ProductPage, ApiError> {
        let mut url = self.endpoint(&["products"])?;
        let pairs = filters.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        debug!(url = %url, "Fetching products");

        let response = self.execute(self.request(Method::GET, url)).await?;
        let products: Vec<Product> = response.decode()?;

        let total_results = response
            .headers
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or_else(|| u32::try_from(products.len()).unwrap_or(u32::MAX));

        Ok(ProductPage {
            products,
            total_results,
        })
    }

    /// Fetch every category. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json(&["categories"]).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Fetch every brand. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self))]
    pub async fn fetch_brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands: Vec<Brand> = self.get_json(&["brands"]).await?;

        self.inner
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn fetch_user(&self, user: &UserId) -> Result<User, ApiError> {
        self.get_json(&["users", user.as_str()]).await
    }

    /// Set a user's admin flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn update_admin(&self, user: &UserId, is_admin: bool) -> Result<(), ApiError> {
        self.send_json(
            Method::PATCH,
            &["users", user.as_str()],
            &AdminUpdate { is_admin },
        )
        .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch a shopper's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn fetch_cart(&self, user: &UserId) -> Result<Vec<CartItem>, ApiError> {
        self.get_json(&["cart", "user", user.as_str()]).await
    }

    /// Add a product to a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item), fields(product = %item.product))]
    pub async fn add_to_cart(&self, item: &NewLineItem) -> Result<(), ApiError> {
        self.send_json(Method::POST, &["cart"], item).await
    }

    /// Change a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn update_cart_item(&self, id: &CartItemId, quantity: u32) -> Result<(), ApiError> {
        self.send_json(
            Method::PATCH,
            &["cart", id.as_str()],
            &QuantityUpdate { quantity },
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn remove_cart_item(&self, id: &CartItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&["cart", id.as_str()])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Fetch a shopper's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn fetch_wishlist(&self, user: &UserId) -> Result<Vec<WishlistItem>, ApiError> {
        self.get_json(&["wishlist", "user", user.as_str()]).await
    }

    /// Add a product to a wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, item), fields(product = %item.product))]
    pub async fn add_to_wishlist(&self, item: &NewLineItem) -> Result<(), ApiError> {
        self.send_json(Method::POST, &["wishlist"], item).await
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item = %id))]
    pub async fn remove_wishlist_item(&self, id: &WishlistItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&["wishlist", id.as_str()])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}

fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use easy_kart_core::BrandId;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base, None, Duration::from_secs(60)).unwrap())
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = client("http://localhost:8000/api");
        let url = client.endpoint(&["cart", "user", "u1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/cart/user/u1");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://localhost:8000");
        let url = client.endpoint(&["cart", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/cart/a%2Fb%20c");
    }

    #[test]
    fn test_listing_query_repeats_keys() {
        let client = client("http://localhost:8000");
        let mut filters = FilterSet::default();
        filters.toggle_brand(BrandId::new("b1"), true);
        filters.toggle_brand(BrandId::new("b2"), true);

        let mut url = client.endpoint(&["products"]).unwrap();
        url.query_pairs_mut().extend_pairs(filters.query_pairs());

        assert_eq!(url.query(), Some("brand=b1&brand=b2&user=true"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(err.to_string(), "API returned HTTP 503: down");
        assert_eq!(
            ApiError::RateLimited(2).to_string(),
            "Rate limited, retry after 2 seconds"
        );
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
