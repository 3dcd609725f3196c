mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn register_add_and_read_back() {
    let app = common::spawn_app().await;
    let product = app.product("Bookcase", 129.0).await;
    let (id, cookie) = app.regular_account("shopper@shop.test").await;

    let response = app
        .request(
            Method::POST,
            &format!("/carts/{}?prodID={}&quantity=2", id, product),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body, json!({ "added": product }));

    let response = app.get(&format!("/carts/{}", id), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    let contents = response.body.as_array().expect("array");
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["quantity"], 2);
    assert_eq!(contents[0]["product"]["id"], product);
    assert_eq!(contents[0]["product"]["name"], "Bookcase");
}

#[tokio::test]
async fn fresh_cart_is_empty() {
    let app = common::spawn_app().await;
    let (id, cookie) = app.regular_account("empty@shop.test").await;

    let response = app.get(&format!("/carts/{}", id), Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn another_accounts_cart_is_forbidden_for_every_verb() {
    let app = common::spawn_app().await;
    let (alice, _) = app.regular_account("alice@shop.test").await;
    let (_, bob_cookie) = app.regular_account("bob@shop.test").await;
    let uri = format!("/carts/{}?prodID=1&quantity=1", alice);

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
        let response = app.request(method.clone(), &uri, None, Some(&bob_cookie)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", method);
        assert_eq!(response.body, common::permission_denied());
    }
}

#[tokio::test]
async fn admins_and_anonymous_callers_cannot_use_carts() {
    let app = common::spawn_app().await;

    let uri = format!("/carts/{}", app.admin_id);
    let response = app.get(&uri, Some(&app.admin_cookie)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get(&uri, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/carts/abc", Some(&app.admin_cookie)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, common::permission_denied());
}

#[tokio::test]
async fn line_rules() {
    let app = common::spawn_app().await;
    let chair = app.product("Chair", 45.0).await;
    let (id, cookie) = app.regular_account("lines@shop.test").await;
    let cart = |query: &str| format!("/carts/{}?{}", id, query);

    // Updating a line that does not exist
    let response = app
        .request(Method::PUT, &cart(&format!("prodID={}&quantity=3", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::POST, &cart(&format!("prodID={}&quantity=1", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Adding the same product twice
    let response = app
        .request(Method::POST, &cart(&format!("prodID={}&quantity=1", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::PUT, &cart(&format!("prodID={}&quantity=4", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.body, json!({ "updated": chair }));
    let contents = app.get(&format!("/carts/{}", id), Some(&cookie)).await.body;
    assert_eq!(contents[0]["quantity"], 4);

    let response = app
        .request(Method::PUT, &cart(&format!("prodID={}&quantity=0", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.body, json!({ "error": "quantity must be at least 1" }));

    let response = app
        .request(Method::DELETE, &cart(&format!("prodID={}", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.body, json!({ "deleted": chair }));

    let response = app
        .request(Method::DELETE, &cart(&format!("prodID={}", chair)), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn line_parameters_are_validated() {
    let app = common::spawn_app().await;
    let (id, cookie) = app.regular_account("params@shop.test").await;

    let response = app
        .request(Method::POST, &format!("/carts/{}?quantity=1", id), None, Some(&cookie))
        .await;
    assert_eq!(response.body, json!({ "error": "missing prodID" }));

    let response = app
        .request(Method::POST, &format!("/carts/{}?prodID=x&quantity=1", id), None, Some(&cookie))
        .await;
    assert_eq!(response.body, json!({ "error": "invalid prodID given x" }));

    let response = app
        .request(Method::POST, &format!("/carts/{}?prodID=404&quantity=1", id), None, Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "product 404 not found" }));
}
