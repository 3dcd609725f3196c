// handlers/public/products.rs - /products and /products/:id

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use serde_json::Value;
use tracing::info;

use crate::database::models::{NewProduct, Product};
use crate::database::{ProductSearch, ReviewScope};
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, query_param, JsonBody, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

const NEWEST_COUNT: i64 = 5;
const MAX_ROW: i64 = i32::MAX as i64;

/// Build the listing filter from `name`, `priceFrom`, `priceTo`, `skip` and `limit`
pub fn search_from_query(params: &HashMap<String, String>) -> Result<ProductSearch, ApiError> {
    let defaults = ProductSearch::default();
    Ok(ProductSearch {
        name: params.get("name").cloned().unwrap_or_default(),
        price_from: bounded(params, "priceFrom", defaults.price_from, |p: &f64| p.is_finite())?,
        price_to: bounded(params, "priceTo", defaults.price_to, |p: &f64| p.is_finite())?,
        skip: bounded(params, "skip", defaults.skip, |s| (1..=MAX_ROW).contains(s))?,
        limit: bounded(params, "limit", defaults.limit, |l| (0..=MAX_ROW).contains(l))?,
    })
}

/// Optional parameter that must also satisfy `valid`
fn bounded<T: FromStr>(
    params: &HashMap<String, String>,
    name: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> Result<T, ApiError> {
    match query_param(params, name)? {
        None => Ok(default),
        Some(value) if valid(&value) => Ok(value),
        Some(_) => Err(ApiError::invalid_argument(format!(
            "invalid {} given {}",
            name,
            params.get(name).map(String::as_str).unwrap_or_default()
        ))),
    }
}

/// GET /products - Filtered listing ordered by id
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Product>> {
    let search = search_from_query(&params)?;
    let products = state.store.search_products(&search).await?;
    Ok(ApiResponse::success(products))
}

/// GET /products/new - The most recently added products
pub async fn newest(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state.store.newest_products(NEWEST_COUNT).await?;
    Ok(ApiResponse::success(products))
}

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewProduct>,
) -> ApiResult<Product> {
    Validator::new().price(body.price).finish()?;

    let product = state.store.create_product(&body).await?;
    info!("Created product {}", product.id);
    Ok(ApiResponse::success(product))
}

/// GET /products/:id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Product> {
    let id = parse_id(&raw_id)?;
    Ok(ApiResponse::success(state.store.product_by_id(id).await?))
}

/// PUT /products/:id - Replace every product field
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<NewProduct>,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;
    Validator::new().price(body.price).finish()?;

    state.store.update_product(id, &body).await?;
    info!("Updated product {}", id);
    Ok(ApiResponse::updated(id))
}

/// DELETE /products/:id - Remove the product with its reviews and category links
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;

    let mut uow = state.store.begin().await?;
    uow.delete_review_links(ReviewScope::Product(id)).await?;
    uow.delete_reviews(ReviewScope::Product(id)).await?;
    uow.delete_category_links(id).await?;
    uow.delete_product(id).await?;
    uow.commit().await?;

    info!("Deleted product {}", id);
    Ok(ApiResponse::deleted(id))
}
