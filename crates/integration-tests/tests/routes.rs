//! End-to-end tests of the storefront router over the fake API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use easy_kart_integration_tests::{FakeApi, cart_line, seed, wishlist_entry};
use easy_kart_storefront::middleware::SHOPPER_HEADER;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(SHOPPER_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, Some("u1"), None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, Some("u1"), Some(body)).await
}

fn ids(products: &Value) -> Vec<String> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_needs_no_shopper() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, body) = call(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));
}

#[tokio::test]
async fn test_missing_shopper_is_unauthorized() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, body) = call(&app, Method::GET, "/cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Unauthorized"));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_listing_has_sections_membership_and_hints() {
    let mut data = seed();
    data.cart = vec![cart_line("ci1", "u1", "p1", 2)];
    data.wishlist = vec![wishlist_entry("w1", "u1", "p2")];
    let api = FakeApi::spawn(data).await;
    let app = api.storefront();

    let (status, body) = get(&app, "/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["products"]), vec!["p1", "p2", "p3"]);
    assert_eq!(body["summary"], json!("Showing 1 to 3 of 3 results"));

    let p1 = &body["products"][0];
    assert_eq!(p1["in_cart"], json!(true));
    assert_eq!(p1["in_wishlist"], json!(false));
    assert_eq!(p1["price_label"], json!("$10.00"));
    assert_eq!(p1["stock_hint"], Value::Null);
    let p2 = &body["products"][1];
    assert_eq!(p2["in_wishlist"], json!(true));
    assert_eq!(p2["stock_hint"], json!("Only 1 stock is left"));

    let sections = body["sections"].as_array().unwrap();
    let electronics = sections.iter().find(|s| s["key"] == "electronics").unwrap();
    assert_eq!(ids(&electronics["products"]), vec!["p1", "p2"]);
    let fashion = sections
        .iter()
        .find(|s| s["key"] == "fashion_and_accessories")
        .unwrap();
    assert_eq!(ids(&fashion["products"]), vec!["p3"]);
}

#[tokio::test]
async fn test_filter_toggles_drive_listing_query() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();
    get(&app, "/products").await;
    api.clear_requests();

    let (status, body) = post(
        &app,
        "/products/filters/brand",
        json!({ "id": "b1", "checked": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["products"]), vec!["p1", "p3"]);
    assert_eq!(body["filters"]["brands"], json!(["b1"]));

    let (_, body) = post(&app, "/products/sort", json!({ "sort": "price", "order": "desc" })).await;
    assert_eq!(ids(&body["products"]), vec!["p3", "p1"]);

    let (_, body) = post(
        &app,
        "/products/filters/category",
        json!({ "id": "c1", "checked": true }),
    )
    .await;
    assert_eq!(ids(&body["products"]), vec!["p1"]);

    assert_eq!(
        api.requests(),
        vec![
            "GET /products?brand=b1&user=true",
            "GET /products?brand=b1&sort=price&order=desc&user=true",
            "GET /products?brand=b1&category=c1&sort=price&order=desc&user=true",
        ]
    );

    let (_, body) = call(&app, Method::DELETE, "/products/filters", Some("u1"), None).await;
    assert_eq!(ids(&body["products"]), vec!["p1", "p2", "p3"]);
    assert_eq!(body["filters"]["sort"], Value::Null);
}

#[tokio::test]
async fn test_unchecking_restores_listing() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    post(&app, "/products/filters/category", json!({ "id": "c2", "checked": true })).await;
    let (_, body) = post(
        &app,
        "/products/filters/category",
        json!({ "id": "c2", "checked": false }),
    )
    .await;

    assert_eq!(body["filters"]["categories"], json!([]));
    assert_eq!(ids(&body["products"]), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_blank_filter_id_is_rejected() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, _) = post(
        &app,
        "/products/filters/brand",
        json!({ "id": " ", "checked": true }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_flow_with_totals() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, body) = post(&app, "/cart", json!({ "product": "p1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["message"], json!("Product added to cart"));
    let line = body["lines"][0]["id"].as_str().unwrap().to_string();

    let (_, body) = post(&app, &format!("/cart/{line}/increment"), json!(null)).await;
    assert_eq!(body["lines"][0]["quantity"], json!(2));
    assert_eq!(body["notice"], Value::Null);

    post(&app, "/cart", json!({ "product": "p2" })).await;
    let (_, body) = get(&app, "/cart").await;
    // 2 x 10.00 + 1 x 5.00, plus 5.55 shipping and 5 taxes
    assert_eq!(body["totals"]["subtotal"], json!(25.0));
    assert_eq!(body["totals"]["total_item_count"], json!(3));
    assert_eq!(body["totals"]["grand_total"], json!(35.55));
    assert_eq!(body["notice"], Value::Null);

    let (_, body) = post(&app, &format!("/cart/{line}/decrement"), json!(null)).await;
    assert_eq!(body["lines"][0]["quantity"], json!(1));
    let (_, body) = post(&app, &format!("/cart/{line}/decrement"), json!(null)).await;
    assert_eq!(body["notice"]["message"], json!("Product removed from cart"));
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);

    assert_eq!(api.requests_matching("DELETE /cart/").len(), 1);
}

#[tokio::test]
async fn test_adding_product_already_in_cart_is_noop() {
    let mut data = seed();
    data.cart = vec![cart_line("ci1", "u1", "p1", 2)];
    let api = FakeApi::spawn(data).await;
    let app = api.storefront();

    let (status, body) = post(&app, "/cart", json!({ "product": "p1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"][0]["quantity"], json!(2));
    assert!(api.requests_matching("POST /cart").is_empty());
}

#[tokio::test]
async fn test_unknown_cart_line_is_not_found() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, body) = post(&app, "/cart/nope/increment", json!(null)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not found: cart item nope"));
}

#[tokio::test]
async fn test_failed_add_reports_error_notice() {
    let api = FakeApi::spawn(seed()).await;
    api.fail("POST /cart");
    let app = api.storefront();

    let (status, body) = post(&app, "/cart", json!({ "product": "p1" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["level"], json!("error"));
    assert_eq!(
        body["notice"]["message"],
        json!("Error adding product to cart, please try again later")
    );
    assert_eq!(body["lines"], json!([]));
}

#[tokio::test]
async fn test_cart_resyncs_after_failed_refetch() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();
    get(&app, "/cart").await;

    api.fail("GET /cart/user/{id}");
    let (status, _) = post(&app, "/cart", json!({ "product": "p1" })).await;
    assert_eq!(status, StatusCode::OK);
    api.heal("GET /cart/user/{id}");

    let (_, body) = get(&app, "/cart").await;
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(body["lines"][0]["product"], json!("p1"));

    // The refreshed cart makes a second add a no-op
    post(&app, "/cart", json!({ "product": "p1" })).await;
    assert_eq!(api.requests_matching("POST /cart").len(), 1);
    assert_eq!(api.with(|d| d.cart.len()), 1);
}

#[tokio::test]
async fn test_wishlist_toggle_route() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (_, body) = post(&app, "/wishlist", json!({ "product": "p3", "checked": true })).await;
    assert_eq!(body["notice"]["message"], json!("Product added to wishlist"));
    assert_eq!(body["items"][0]["product"], json!("p3"));
    assert_eq!(body["items"][0]["title"], json!("Product p3"));

    // Checking again changes nothing
    let (_, body) = post(&app, "/wishlist", json!({ "product": "p3", "checked": true })).await;
    assert_eq!(body["notice"], Value::Null);
    assert_eq!(api.requests_matching("POST /wishlist").len(), 1);

    let (_, body) = post(&app, "/wishlist", json!({ "product": "p3", "checked": false })).await;
    assert_eq!(body["notice"]["message"], json!("Product removed from wishlist"));
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_nav_badges_count_lines() {
    let mut data = seed();
    data.cart = vec![cart_line("ci1", "u1", "p1", 5), cart_line("ci2", "u1", "p2", 1)];
    data.wishlist = vec![wishlist_entry("w1", "u1", "p3")];
    let api = FakeApi::spawn(data).await;
    let app = api.storefront();

    let (_, body) = get(&app, "/nav").await;

    assert_eq!(body["greeting"], json!("Hey👋, Ada"));
    assert_eq!(body["cart_badge"], json!(2));
    assert_eq!(body["wishlist_badge"], json!(1));
    assert_eq!(body["menu"][0]["name"], json!("Home"));
}

#[tokio::test]
async fn test_admin_mode_toggle() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (status, body) = call(&app, Method::POST, "/account/admin-mode", Some("u1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], json!(true));
    assert_eq!(body["landing"], json!("/admin/dashboard"));

    let (_, nav) = get(&app, "/nav").await;
    assert_eq!(nav["is_admin"], json!(true));
    assert_eq!(nav["cart_badge"], Value::Null);
    assert_eq!(nav["menu"][0]["name"], json!("Add new Product"));

    let (_, listing) = get(&app, "/products").await;
    assert_eq!(listing["products"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_catalog_filters() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let (_, body) = get(&app, "/catalog/filters").await;

    assert_eq!(body["brands"].as_array().unwrap().len(), 2);
    assert_eq!(body["categories"][0]["name"], json!("smartphones"));
    assert_eq!(body["sort_options"][0]["name"], json!("Price: low to high"));
    assert_eq!(body["sort_options"][0]["order"], json!("asc"));
}

#[tokio::test]
async fn test_shoppers_are_isolated() {
    let mut data = seed();
    data.cart = vec![cart_line("ci1", "u1", "p1", 1)];
    data.users.push(easy_kart_integration_tests::user("u2", "Bo", false));
    let api = FakeApi::spawn(data).await;
    let app = api.storefront();

    post(&app, "/products/filters/brand", json!({ "id": "b2", "checked": true })).await;

    let (_, other) = call(&app, Method::GET, "/products", Some("u2"), None).await;
    assert_eq!(other["filters"]["brands"], json!([]));
    let (_, cart) = call(&app, Method::GET, "/cart", Some("u2"), None).await;
    assert_eq!(cart["lines"], json!([]));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let api = FakeApi::spawn(seed()).await;
    let app = api.storefront();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}
