// handlers/elevated/accounts.rs - /accounts and /accounts/:id (admin only)

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::database::models::{Account, AccountUpdate, NewAccount};
use crate::database::{DatabaseError, ReviewScope};
use crate::handlers::utils::{parse_id, JsonBody, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::UserType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// GET /accounts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Account>> {
    Ok(ApiResponse::success(state.store.list_accounts().await?))
}

/// POST /accounts - Register a Regular account together with its empty cart
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateAccountRequest>,
) -> ApiResult<Account> {
    Validator::new()
        .email(&body.email)
        .password(&body.password)
        .names(&body.first_name, &body.last_name)
        .finish()?;

    let encrypted_password = state.passwords.hash(&body.password)?;
    let new_account = NewAccount {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        encrypted_password,
        user_type: UserType::Regular,
    };

    let mut uow = state.store.begin().await?;
    let account = uow.create_account(&new_account).await?;
    uow.create_cart(account.id).await?;
    uow.commit().await?;

    info!("Created account {}", account.id);
    Ok(ApiResponse::success(account))
}

/// GET /accounts/:id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Account> {
    let id = parse_id(&raw_id)?;
    Ok(ApiResponse::success(state.store.account_by_id(id).await?))
}

/// PUT /accounts/:id - Change name and email
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<AccountUpdate>,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;
    Validator::new()
        .email(&body.email)
        .names(&body.first_name, &body.last_name)
        .finish()?;

    state.store.update_account(id, &body).await?;
    info!("Updated account {}", id);
    Ok(ApiResponse::updated(id))
}

/// DELETE /accounts/:id - Remove the account, its cart and its reviews
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;

    let mut uow = state.store.begin().await?;
    match uow.cart_by_account(id).await {
        Ok(cart) => {
            uow.delete_cart_lines(cart.id).await?;
            uow.delete_cart(cart.id).await?;
        }
        Err(DatabaseError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }
    uow.delete_review_links(ReviewScope::Account(id)).await?;
    uow.delete_reviews(ReviewScope::Account(id)).await?;
    uow.delete_account(id).await?;
    uow.commit().await?;

    info!("Deleted account {}", id);
    Ok(ApiResponse::deleted(id))
}
