//! Integration tests for the remote API client against the fake API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use easy_kart_core::commands::NewLineItem;
use easy_kart_core::filters::{FilterSet, SORT_OPTIONS, Scope};
use easy_kart_core::{BrandId, CartItemId, CategoryId, ProductId, UserId};
use easy_kart_integration_tests::{FakeApi, cart_line, seed};
use easy_kart_storefront::api::ApiError;

#[tokio::test]
async fn test_fetch_products_sends_filter_query() {
    let api = FakeApi::spawn(seed()).await;
    let client = api.client();

    let mut filters = FilterSet::new(Scope::UserVisible);
    filters.toggle_brand(BrandId::new("b1"), true);
    filters.toggle_category(CategoryId::new("c1"), true);
    filters.toggle_category(CategoryId::new("c3"), true);
    filters.set_sort(Some(SORT_OPTIONS[1].spec));

    let page = client.fetch_products(&filters).await.unwrap();

    assert_eq!(
        api.requests(),
        vec![
            "GET /products?brand=b1&category=c1&category=c3&sort=price&order=desc&user=true"
                .to_string()
        ]
    );
    let ids: Vec<_> = page.products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p1"]);
    assert_eq!(page.total_results, 2);
}

#[tokio::test]
async fn test_fetch_products_admin_scope_sees_hidden() {
    let api = FakeApi::spawn(seed()).await;
    let client = api.client();

    let shopper = client
        .fetch_products(&FilterSet::new(Scope::UserVisible))
        .await
        .unwrap();
    let admin = client
        .fetch_products(&FilterSet::new(Scope::All))
        .await
        .unwrap();

    assert_eq!(shopper.total_results, 3);
    assert_eq!(admin.total_results, 4);
    assert_eq!(api.requests()[1], "GET /products");
}

#[tokio::test]
async fn test_reference_data_is_cached() {
    let api = FakeApi::spawn(seed()).await;
    let client = api.client();

    let first = client.fetch_categories().await.unwrap();
    let second = client.fetch_categories().await.unwrap();
    client.fetch_brands().await.unwrap();
    client.fetch_brands().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.requests_matching("GET /categories").len(), 1);
    assert_eq!(api.requests_matching("GET /brands").len(), 1);
}

#[tokio::test]
async fn test_cart_round_trip() {
    let api = FakeApi::spawn(seed()).await;
    let client = api.client();
    let user = UserId::new("u1");

    client
        .add_to_cart(&NewLineItem {
            user: user.clone(),
            product: ProductId::new("p1"),
        })
        .await
        .unwrap();
    let cart = client.fetch_cart(&user).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 1);
    // The fake populates products, as the real API does
    assert!(cart[0].product.product().is_some());

    client.update_cart_item(&cart[0].id, 3).await.unwrap();
    assert_eq!(client.fetch_cart(&user).await.unwrap()[0].quantity, 3);

    client.remove_cart_item(&cart[0].id).await.unwrap();
    assert!(client.fetch_cart(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_is_scoped_to_user() {
    let mut data = seed();
    data.cart = vec![cart_line("ci1", "u1", "p1", 1), cart_line("ci2", "u2", "p2", 1)];
    let api = FakeApi::spawn(data).await;

    let cart = api.client().fetch_cart(&UserId::new("u1")).await.unwrap();

    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].id, CartItemId::new("ci1"));
}

#[tokio::test]
async fn test_missing_record_maps_to_not_found() {
    let api = FakeApi::spawn(seed()).await;

    let err = api
        .client()
        .fetch_user(&UserId::new("nobody"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let api = FakeApi::spawn(seed()).await;
    api.fail("GET /cart/user/{id}");

    let err = api
        .client()
        .fetch_cart(&UserId::new("u1"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ApiError::Status { status: 500, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_admin_update_payload() {
    let api = FakeApi::spawn(seed()).await;
    let client = api.client();

    client.update_admin(&UserId::new("u1"), true).await.unwrap();

    let bodies = api.with(|d| d.bodies.clone());
    assert_eq!(
        bodies,
        vec![(
            "PATCH /users/{id}".to_string(),
            serde_json::json!({ "isAdmin": true })
        )]
    );
    assert!(client.fetch_user(&UserId::new("u1")).await.unwrap().is_admin);
}
