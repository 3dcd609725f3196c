#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use storefront_api::auth::PasswordHashing;
use storefront_api::config::SecurityConfig;
use storefront_api::database::models::NewAccount;
use storefront_api::database::{InMemoryStore, Store};
use storefront_api::router;
use storefront_api::state::AppState;
use storefront_api::types::UserType;

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const JWT_SECRET: &str = "integration-test-secret";

static TRACING: Once = Once::new();

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
    pub admin_id: i32,
    pub admin_cookie: String,
}

pub fn security() -> SecurityConfig {
    SecurityConfig {
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiry_hours: 24,
        cookie_secure: false,
        enable_cors: false,
        cors_origins: vec![],
    }
}

/// Router over a fresh in-memory store with one Admin account, already logged in
pub async fn spawn_app() -> TestApp {
    spawn_app_on(Arc::new(InMemoryStore::new())).await
}

/// Same as `spawn_app` over an existing, empty store
pub async fn spawn_app_on(store: Arc<dyn Store>) -> TestApp {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });

    let passwords = PasswordHashing::with_params(8, 1, 1).expect("argon2 params");

    let mut uow = store.begin().await.expect("begin");
    let admin = uow
        .create_account(&NewAccount {
            first_name: "Store".into(),
            last_name: "Admin".into(),
            email: ADMIN_EMAIL.into(),
            encrypted_password: passwords.hash(ADMIN_PASSWORD).expect("hash"),
            user_type: UserType::Admin,
        })
        .await
        .expect("create admin");
    uow.create_cart(admin.id).await.expect("admin cart");
    uow.commit().await.expect("commit");

    let state = AppState::new(store.clone(), &security(), passwords);
    let router = router::app(state);

    let mut app = TestApp {
        router,
        store,
        admin_id: admin.id,
        admin_cookie: String::new(),
    };
    app.admin_cookie = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    app
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("oneshot");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Response { status, headers, body }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        self.request(Method::GET, uri, None, cookie).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, raw: &'static str) -> Response {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::COOKIE, &self.admin_cookie)
                    .body(Body::from(raw))
                    .expect("request"),
            )
            .await
            .expect("oneshot");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        Response {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Log in and return the `jwt=<token>` cookie pair
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/login",
                Some(json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        session_pair(&response.headers).expect("session cookie")
    }

    /// Register a Regular account through the admin API and log in as it
    pub async fn regular_account(&self, email: &str) -> (i32, String) {
        let response = self
            .request(
                Method::POST,
                "/accounts",
                Some(json!({
                    "firstName": "Reg",
                    "lastName": "Ular",
                    "email": email,
                    "password": "password123",
                })),
                Some(&self.admin_cookie),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "create failed: {}", response.body);
        let id = response.body["id"].as_i64().expect("account id") as i32;
        let cookie = self.login(email, "password123").await;
        (id, cookie)
    }

    pub async fn product(&self, name: &str, price: f64) -> i32 {
        let response = self
            .request(
                Method::POST,
                "/products",
                Some(json!({
                    "name": name,
                    "price": price,
                    "measurements": "10x10x10 cm",
                    "description": "test product",
                    "packaging": "1 box",
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "product failed: {}", response.body);
        response.body["id"].as_i64().expect("product id") as i32
    }
}

/// `jwt=<token>` from a `Set-Cookie` header
pub fn session_pair(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("jwt="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn permission_denied() -> Value {
    json!({ "error": "permission denied" })
}
