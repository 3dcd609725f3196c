use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::utils::{method_not_allowed, missing_id};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_owner};
use crate::state::AppState;

/// The full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Admin only
        .merge(account_routes(state.clone()))
        // Owner only
        .merge(cart_routes(state.clone()))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{categories, health, login, products, reviews};

    Router::new()
        .route("/health", get(health::get).fallback(method_not_allowed))
        .route("/login", post(login::post).fallback(method_not_allowed))
        .route(
            "/products",
            get(products::list)
                .post(products::create)
                .put(missing_id)
                .fallback(method_not_allowed),
        )
        // Literal segments take priority over /products/:id
        .route("/products/new", get(products::newest).fallback(method_not_allowed))
        .route(
            "/products/categories",
            get(categories::list).fallback(method_not_allowed),
        )
        .route(
            "/products/reviews",
            get(reviews::list)
                .post(reviews::create)
                .put(missing_id)
                .fallback(method_not_allowed),
        )
        .route(
            "/products/reviews/:id",
            get(reviews::get)
                .put(reviews::update)
                .delete(reviews::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete)
                .fallback(method_not_allowed),
        )
}

fn account_routes(state: AppState) -> Router<AppState> {
    use elevated::accounts;

    // route_layer also wraps each route's method fallback
    Router::new()
        .route(
            "/accounts",
            get(accounts::list)
                .post(accounts::create)
                .put(missing_id)
                .fallback(method_not_allowed),
        )
        .route(
            "/accounts/:id",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete)
                .fallback(method_not_allowed),
        )
        .route_layer(from_fn_with_state(state, require_admin))
}

fn cart_routes(state: AppState) -> Router<AppState> {
    use protected::carts;

    Router::new()
        .route(
            "/carts/:id",
            get(carts::get)
                .post(carts::add)
                .put(carts::update)
                .delete(carts::delete)
                .fallback(method_not_allowed),
        )
        .route_layer(from_fn_with_state(state, require_owner))
}

/// CORS from configuration; `None` when disabled. An empty origin list allows any origin.
pub fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}
