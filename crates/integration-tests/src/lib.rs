//! Integration test support for Easy Kart.
//!
//! Provides [`FakeApi`], an in-process stand-in for the remote catalog/cart
//! API built with `axum` and bound to an ephemeral port, plus fixtures and
//! helpers for driving the storefront router in-process.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p easy-kart-integration-tests
//! ```
//!
//! No external services are needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{MatchedPath, Path, RawQuery, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use easy_kart_core::commands::{NewLineItem, QuantityUpdate};
use easy_kart_core::{
    Brand, BrandId, BrandRef, CartItem, CartItemId, Category, CategoryId, Price, Product,
    ProductId, ProductRef, User, UserId, WishlistItem, WishlistItemId,
};
use easy_kart_storefront::api::{ApiClient, TOTAL_COUNT_HEADER};
use easy_kart_storefront::config::StorefrontConfig;
use easy_kart_storefront::state::AppState;
use serde::Deserialize;

// =============================================================================
// Fake remote API
// =============================================================================

/// Data served by the fake API, plus a log of what it was asked.
#[derive(Debug, Default, Clone)]
pub struct FakeData {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub users: Vec<User>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<WishlistItem>,
    /// Every request as `METHOD /path?query`, in arrival order.
    pub requests: Vec<String>,
    /// Parsed JSON bodies of mutating requests, keyed like `failing`.
    pub bodies: Vec<(String, serde_json::Value)>,
    /// Routes (`METHOD /matched/{path}`) that answer 500.
    pub failing: HashSet<String>,
    /// One-shot delays applied to the next request for a route.
    pub delays: HashMap<String, Duration>,
    next_id: u64,
}

impl FakeData {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn embed(&self, reference: &ProductRef) -> ProductRef {
        self.products
            .iter()
            .find(|p| &p.id == reference.id())
            .map_or_else(
                || reference.clone(),
                |p| ProductRef::Embedded(Box::new(p.clone())),
            )
    }
}

type Shared = Arc<Mutex<FakeData>>;

fn lock(shared: &Shared) -> MutexGuard<'_, FakeData> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running fake API server.
pub struct FakeApi {
    addr: SocketAddr,
    data: Shared,
}

impl FakeApi {
    /// Start a fake API serving `data` on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn(data: FakeData) -> Self {
        let data: Shared = Arc::new(Mutex::new(data));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/categories", get(list_categories))
            .route("/brands", get(list_brands))
            .route("/users/{id}", get(get_user).patch(update_user))
            .route("/cart", axum::routing::post(add_cart_item))
            .route("/cart/user/{id}", get(list_cart))
            .route("/cart/{id}", patch(update_cart_item).delete(remove_cart_item))
            .route("/wishlist", axum::routing::post(add_wishlist_item))
            .route("/wishlist/user/{id}", get(list_wishlist))
            .route("/wishlist/{id}", axum::routing::delete(remove_wishlist_item))
            .route_layer(axum::middleware::from_fn_with_state(
                Arc::clone(&data),
                record_request,
            ))
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind fake API: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("fake API has no address: {e}"));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, data }
    }

    /// Base URL of the fake API.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Read or change the served data.
    pub fn with<T>(&self, f: impl FnOnce(&mut FakeData) -> T) -> T {
        f(&mut lock(&self.data))
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.with(|d| d.requests.clone())
    }

    /// Requests received so far whose method and path start with `prefix`.
    #[must_use]
    pub fn requests_matching(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.starts_with(prefix))
            .collect()
    }

    /// Forget logged requests.
    pub fn clear_requests(&self) {
        self.with(|d| {
            d.requests.clear();
            d.bodies.clear();
        });
    }

    /// Make `route` (e.g. `"POST /cart"`) answer 500 until [`FakeApi::heal`].
    pub fn fail(&self, route: &str) {
        self.with(|d| d.failing.insert(route.to_string()));
    }

    /// Stop failing `route`.
    pub fn heal(&self, route: &str) {
        self.with(|d| d.failing.remove(route));
    }

    /// Delay the next request for `route` by `delay`.
    pub fn delay_once(&self, route: &str, delay: Duration) {
        self.with(|d| d.delays.insert(route.to_string(), delay));
    }

    /// An API client pointed at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server URL is rejected by the config parser.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config().api)
    }

    /// Storefront configuration pointed at this server, with the default
    /// flat charges of 5.55 shipping and 5 taxes.
    ///
    /// # Panics
    ///
    /// Panics if the server URL is rejected by the config parser.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::with_api_url(&self.url())
            .unwrap_or_else(|e| panic!("fake API URL rejected: {e}"))
    }

    /// The storefront router wired to this server.
    #[must_use]
    pub fn storefront(&self) -> Router {
        easy_kart_storefront::app(AppState::new(self.config()))
    }
}

/// Log the request, then apply injected failures and delays.
async fn record_request(
    State(data): State<Shared>,
    matched: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let route = format!("{method} {}", matched.as_str());
    let line = request.uri().query().map_or_else(
        || format!("{method} {}", request.uri().path()),
        |q| format!("{method} {}?{q}", request.uri().path()),
    );

    let (fail, delay) = {
        let mut data = lock(&data);
        data.requests.push(line);
        (data.failing.contains(&route), data.delays.remove(&route))
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "injected failure").into_response();
    }

    next.run(request).await
}

fn record_body(data: &mut FakeData, route: &str, body: &impl serde::Serialize) {
    if let Ok(value) = serde_json::to_value(body) {
        data.bodies.push((route.to_string(), value));
    }
}

async fn list_products(
    State(data): State<Shared>,
    RawQuery(query): RawQuery,
) -> (HeaderMap, Json<Vec<Product>>) {
    let data = lock(&data);

    let mut brands = Vec::new();
    let mut categories = Vec::new();
    let mut order = None;
    let mut user_only = false;
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "brand" => brands.push(BrandId::new(value.into_owned())),
            "category" => categories.push(CategoryId::new(value.into_owned())),
            "order" => order = Some(value.into_owned()),
            "user" => user_only = value == "true",
            _ => {}
        }
    }

    let mut products: Vec<Product> = data
        .products
        .iter()
        .filter(|p| brands.is_empty() || brands.contains(p.brand.id()))
        .filter(|p| categories.is_empty() || categories.contains(&p.category))
        .filter(|p| !(user_only && p.is_deleted))
        .cloned()
        .collect();
    match order.as_deref() {
        Some("asc") => products.sort_by_key(|p| p.price),
        Some("desc") => products.sort_by_key(|p| std::cmp::Reverse(p.price)),
        _ => {}
    }

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(products.len()));
    (headers, Json(products))
}

async fn list_categories(State(data): State<Shared>) -> Json<Vec<Category>> {
    Json(lock(&data).categories.clone())
}

async fn list_brands(State(data): State<Shared>) -> Json<Vec<Brand>> {
    Json(lock(&data).brands.clone())
}

async fn get_user(
    State(data): State<Shared>,
    Path(id): Path<UserId>,
) -> Result<Json<User>, StatusCode> {
    lock(&data)
        .users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUpdate {
    is_admin: bool,
}

async fn update_user(
    State(data): State<Shared>,
    Path(id): Path<UserId>,
    Json(body): Json<AdminUpdate>,
) -> Result<Json<User>, StatusCode> {
    let mut data = lock(&data);
    record_body(&mut data, "PATCH /users/{id}", &body);
    let user = data
        .users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    user.is_admin = body.is_admin;
    Ok(Json(user.clone()))
}

async fn list_cart(State(data): State<Shared>, Path(id): Path<UserId>) -> Json<Vec<CartItem>> {
    let data = lock(&data);
    Json(
        data.cart
            .iter()
            .filter(|item| item.user == id)
            .map(|item| CartItem {
                product: data.embed(&item.product),
                ..item.clone()
            })
            .collect(),
    )
}

async fn add_cart_item(
    State(data): State<Shared>,
    Json(body): Json<NewLineItem>,
) -> (StatusCode, Json<CartItem>) {
    let mut data = lock(&data);
    record_body(&mut data, "POST /cart", &body);
    let item = CartItem {
        id: CartItemId::new(data.next_id("ci")),
        user: body.user,
        product: ProductRef::Id(body.product),
        quantity: 1,
    };
    data.cart.push(item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn update_cart_item(
    State(data): State<Shared>,
    Path(id): Path<CartItemId>,
    Json(body): Json<QuantityUpdate>,
) -> Result<Json<CartItem>, StatusCode> {
    let mut data = lock(&data);
    record_body(&mut data, "PATCH /cart/{id}", &body);
    let item = data
        .cart
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    item.quantity = body.quantity;
    Ok(Json(item.clone()))
}

async fn remove_cart_item(State(data): State<Shared>, Path(id): Path<CartItemId>) -> StatusCode {
    let mut data = lock(&data);
    let before = data.cart.len();
    data.cart.retain(|item| item.id != id);
    if data.cart.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn list_wishlist(
    State(data): State<Shared>,
    Path(id): Path<UserId>,
) -> Json<Vec<WishlistItem>> {
    let data = lock(&data);
    Json(
        data.wishlist
            .iter()
            .filter(|item| item.user == id)
            .map(|item| WishlistItem {
                product: data.embed(&item.product),
                ..item.clone()
            })
            .collect(),
    )
}

async fn add_wishlist_item(
    State(data): State<Shared>,
    Json(body): Json<NewLineItem>,
) -> (StatusCode, Json<WishlistItem>) {
    let mut data = lock(&data);
    record_body(&mut data, "POST /wishlist", &body);
    let item = WishlistItem {
        id: WishlistItemId::new(data.next_id("w")),
        user: body.user,
        product: ProductRef::Id(body.product),
    };
    data.wishlist.push(item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn remove_wishlist_item(
    State(data): State<Shared>,
    Path(id): Path<WishlistItemId>,
) -> StatusCode {
    let mut data = lock(&data);
    let before = data.wishlist.len();
    data.wishlist.retain(|item| item.id != id);
    if data.wishlist.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product with an embedded brand.
#[must_use]
pub fn product(id: &str, cents: i64, brand: &str, category: &str, stock_quantity: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: Price::from_cents(cents),
        thumbnail: Some(format!("https://img.example.com/{id}.png")),
        brand: BrandRef::Embedded(Brand {
            id: BrandId::new(brand),
            name: format!("Brand {brand}"),
        }),
        category: CategoryId::new(category),
        stock_quantity,
        is_deleted: false,
    }
}

/// A shopper record.
#[must_use]
pub fn user(id: &str, name: &str, is_admin: bool) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        is_admin,
        is_verified: true,
    }
}

/// A cart line pointing at `product` by id.
#[must_use]
pub fn cart_line(id: &str, user: &str, product: &str, quantity: u32) -> CartItem {
    CartItem {
        id: CartItemId::new(id),
        user: UserId::new(user),
        product: ProductRef::Id(ProductId::new(product)),
        quantity,
    }
}

/// A wishlist entry pointing at `product` by id.
#[must_use]
pub fn wishlist_entry(id: &str, user: &str, product: &str) -> WishlistItem {
    WishlistItem {
        id: WishlistItemId::new(id),
        user: UserId::new(user),
        product: ProductRef::Id(ProductId::new(product)),
    }
}

/// A small catalog: two electronics categories, one fashion category,
/// two brands, one hidden product and shoppers `u1` and admin `a1`.
///
/// | product | price  | brand | category        | stock |
/// |---------|--------|-------|-----------------|-------|
/// | p1      | 10.00  | b1    | c1 smartphones  | 50    |
/// | p2      | 5.00   | b2    | c2 laptops      | 1     |
/// | p3      | 25.50  | b1    | c3 tops         | 15    |
/// | p4      | 99.99  | b2    | c1 smartphones  | 0, deleted |
#[must_use]
pub fn seed() -> FakeData {
    let mut hidden = product("p4", 9999, "b2", "c1", 0);
    hidden.is_deleted = true;

    FakeData {
        products: vec![
            product("p1", 1000, "b1", "c1", 50),
            product("p2", 500, "b2", "c2", 1),
            product("p3", 2550, "b1", "c3", 15),
            hidden,
        ],
        categories: vec![
            Category {
                id: CategoryId::new("c1"),
                name: "smartphones".to_string(),
            },
            Category {
                id: CategoryId::new("c2"),
                name: "laptops".to_string(),
            },
            Category {
                id: CategoryId::new("c3"),
                name: "tops".to_string(),
            },
        ],
        brands: vec![
            Brand {
                id: BrandId::new("b1"),
                name: "Brand b1".to_string(),
            },
            Brand {
                id: BrandId::new("b2"),
                name: "Brand b2".to_string(),
            },
        ],
        users: vec![user("u1", "Ada", false), user("a1", "Root", true)],
        ..FakeData::default()
    }
}
