// handlers/public/categories.rs - GET /products/categories

use axum::extract::State;

use crate::database::models::Category;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products/categories - All category names, alphabetical
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    Ok(ApiResponse::success(state.store.list_categories().await?))
}
