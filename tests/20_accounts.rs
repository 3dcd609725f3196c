mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use storefront_api::database::Store;

#[tokio::test]
async fn admin_lists_accounts_without_password_hashes() {
    let app = common::spawn_app().await;
    let response = app.get("/accounts", Some(&app.admin_cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    let accounts = response.body.as_array().expect("array");
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["email"], common::ADMIN_EMAIL);
    assert_eq!(accounts[0]["userType"], "Admin");
    assert!(accounts[0].get("encryptedPassword").is_none());
}

#[tokio::test]
async fn account_routes_reject_non_admins() {
    let app = common::spawn_app().await;
    let (id, regular) = app.regular_account("reg@shop.test").await;

    for (method, uri) in [
        (Method::GET, "/accounts".to_string()),
        (Method::POST, "/accounts".to_string()),
        (Method::GET, format!("/accounts/{}", id)),
        (Method::DELETE, format!("/accounts/{}", id)),
        // Unsupported verbs are gated too
        (Method::PATCH, format!("/accounts/{}", id)),
    ] {
        let response = app.request(method.clone(), &uri, None, Some(&regular)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(response.body, common::permission_denied());
    }

    let response = app.get("/accounts", None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/accounts", Some("jwt=not.a.token")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body, common::permission_denied());
}

#[tokio::test]
async fn unsupported_verb_reaches_admin_as_method_error() {
    let app = common::spawn_app().await;
    let response = app
        .request(Method::PATCH, "/accounts/1", None, Some(&app.admin_cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "method not allowed PATCH" }));
}

#[tokio::test]
async fn short_password_is_rejected_before_any_write() {
    let app = common::spawn_app().await;
    let response = app
        .request(
            Method::POST,
            "/accounts",
            Some(json!({
                "firstName": "Short",
                "lastName": "Pass",
                "email": "short@shop.test",
                "password": "1234567",
            })),
            Some(&app.admin_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "password needs to be at least 8 characters long" })
    );
    assert_eq!(app.store.list_accounts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn every_failing_field_is_reported() {
    let app = common::spawn_app().await;
    let response = app
        .request(
            Method::POST,
            "/accounts",
            Some(json!({ "email": "not-an-email", "password": "long-enough" })),
            Some(&app.admin_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "invalid email, empty firstname, empty lastname"
    );
}

#[tokio::test]
async fn created_account_is_regular_with_an_empty_cart() {
    let app = common::spawn_app().await;
    let response = app
        .request(
            Method::POST,
            "/accounts",
            Some(json!({
                "firstName": "New",
                "lastName": "Customer",
                "email": "new@shop.test",
                "password": "password123",
                "userType": "Admin",
            })),
            Some(&app.admin_cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["userType"], "Regular");
    assert_eq!(response.body["firstName"], "New");
    assert!(response.body.get("encryptedPassword").is_none());

    let id = response.body["id"].as_i64().unwrap() as i32;
    let cart = app.store.cart_by_account(id).await.unwrap();
    assert!(app.store.cart_lines(cart.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = common::spawn_app().await;
    app.regular_account("twice@shop.test").await;

    let response = app
        .request(
            Method::POST,
            "/accounts",
            Some(json!({
                "firstName": "Again",
                "lastName": "Twice",
                "email": "twice@shop.test",
                "password": "password123",
            })),
            Some(&app.admin_cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.list_accounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn bad_ids_cite_the_literal() {
    let app = common::spawn_app().await;

    let response = app.get("/accounts/abc", Some(&app.admin_cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "invalid id given abc" }));

    let response = app
        .request(Method::PUT, "/accounts", Some(json!({})), Some(&app.admin_cookie))
        .await;
    assert_eq!(response.body, json!({ "error": "invalid id given " }));

    let response = app.get("/accounts/999", Some(&app.admin_cookie)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "account 999 not found" }));
}

#[tokio::test]
async fn update_changes_profile_fields() {
    let app = common::spawn_app().await;
    let (id, _) = app.regular_account("before@shop.test").await;
    let uri = format!("/accounts/{}", id);

    let response = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "firstName": "After", "lastName": "Rename", "email": "after@shop.test" })),
            Some(&app.admin_cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "updated": id }));

    let response = app.get(&uri, Some(&app.admin_cookie)).await;
    assert_eq!(response.body["firstName"], "After");
    assert_eq!(response.body["email"], "after@shop.test");

    let response = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "firstName": "", "lastName": "Rename", "email": "after@shop.test" })),
            Some(&app.admin_cookie),
        )
        .await;
    assert_eq!(response.body, json!({ "error": "empty firstname" }));
}

#[tokio::test]
async fn delete_removes_cart_and_reviews_first() {
    let app = common::spawn_app().await;
    let (id, cookie) = app.regular_account("leaving@shop.test").await;
    let product = app.product("Stool", 25.0).await;

    let response = app
        .request(
            Method::POST,
            &format!("/carts/{}?prodID={}&quantity=1", id, product),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/products/reviews",
            Some(json!({ "accID": id, "prodID": product, "ratingGiven": 5.0, "text": "Sturdy" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(Method::DELETE, &format!("/accounts/{}", id), None, Some(&app.admin_cookie))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body, json!({ "deleted": id }));

    assert!(app.store.account_by_id(id).await.is_err());
    assert!(app.store.cart_by_account(id).await.is_err());
    assert!(app.store.list_reviews().await.unwrap().is_empty());
    // The product itself is untouched
    assert!(app.store.product_by_id(product).await.is_ok());
}

#[tokio::test]
async fn deleting_a_missing_account_changes_nothing() {
    let app = common::spawn_app().await;
    let response = app
        .request(Method::DELETE, "/accounts/42", None, Some(&app.admin_cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "account 42 not found" }));
    assert_eq!(app.store.list_accounts().await.unwrap().len(), 1);
}
