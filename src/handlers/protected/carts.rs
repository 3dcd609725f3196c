// handlers/protected/carts.rs - /carts/:id (owner only)
//
// The gate has matched the path id to the caller, so the account comes from the session.

use std::collections::HashMap;

use axum::extract::{Extension, Query, State};
use serde_json::Value;
use tracing::info;

use crate::database::models::{CartLine, ProductQuantity};
use crate::error::ApiError;
use crate::handlers::utils::{required_param, Validator};
use crate::middleware::{ApiResponse, ApiResult, AuthAccount};
use crate::state::AppState;

/// GET /carts/:id - Cart contents with full products
pub async fn get(
    State(state): State<AppState>,
    Extension(account): Extension<AuthAccount>,
) -> ApiResult<Vec<ProductQuantity>> {
    let cart = state.store.cart_by_account(account.account_id).await?;

    let lines = state.store.cart_lines(cart.id).await?;
    let mut contents = Vec::with_capacity(lines.len());
    for line in lines {
        let product = state.store.product_by_id(line.product_id).await?;
        contents.push(ProductQuantity {
            product,
            quantity: line.quantity,
        });
    }
    Ok(ApiResponse::success(contents))
}

/// POST /carts/:id?prodID=&quantity= - Add a product not yet in the cart
pub async fn add(
    State(state): State<AppState>,
    Extension(account): Extension<AuthAccount>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let line = line_from_query(&state, account, &params).await?;
    state.store.product_by_id(line.product_id).await?;

    state.store.add_cart_line(&line).await?;
    info!("Added product {} to cart {}", line.product_id, line.cart_id);
    Ok(ApiResponse::added(line.product_id))
}

/// PUT /carts/:id?prodID=&quantity= - Change the quantity of a product already in the cart
pub async fn update(
    State(state): State<AppState>,
    Extension(account): Extension<AuthAccount>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let line = line_from_query(&state, account, &params).await?;

    state.store.update_cart_line(&line).await?;
    info!(
        "Set product {} in cart {} to {}",
        line.product_id, line.cart_id, line.quantity
    );
    Ok(ApiResponse::updated(line.product_id))
}

/// DELETE /carts/:id?prodID= - Remove one product from the cart
pub async fn delete(
    State(state): State<AppState>,
    Extension(account): Extension<AuthAccount>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let product_id: i32 = required_param(&params, "prodID")?;
    let cart = state.store.cart_by_account(account.account_id).await?;

    state.store.delete_cart_line(cart.id, product_id).await?;
    info!("Removed product {} from cart {}", product_id, cart.id);
    Ok(ApiResponse::deleted(product_id))
}

async fn line_from_query(
    state: &AppState,
    account: AuthAccount,
    params: &HashMap<String, String>,
) -> Result<CartLine, ApiError> {
    let product_id: i32 = required_param(params, "prodID")?;
    let quantity: i32 = required_param(params, "quantity")?;
    Validator::new().quantity(quantity).finish()?;

    let cart = state.store.cart_by_account(account.account_id).await?;
    Ok(CartLine {
        cart_id: cart.id,
        product_id,
        quantity,
    })
}
