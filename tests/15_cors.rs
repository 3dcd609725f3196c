mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use tower::ServiceExt;

use storefront_api::router;

const ORIGIN: &str = "https://shop.example.com";

#[tokio::test]
async fn json_preflight_from_a_listed_origin_is_allowed() {
    let app = common::spawn_app().await;
    let mut security = common::security();
    security.enable_cors = true;
    security.cors_origins = vec![ORIGIN.to_string()];
    let cors = router::cors_layer(&security).expect("cors enabled");

    let response = app
        .router
        .clone()
        .layer(cors)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/products")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("oneshot");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .expect("ascii");
    assert!(allowed.to_ascii_lowercase().contains("content-type"), "{}", allowed);
}

#[test]
fn disabled_cors_adds_no_layer() {
    assert!(router::cors_layer(&common::security()).is_none());
}
