// handlers/public/reviews.rs - /products/reviews and /products/reviews/:id

use axum::extract::{Path, State};
use serde_json::Value;
use tracing::info;

use crate::database::models::{NewReview, Review, ReviewUpdate};
use crate::database::ReviewScope;
use crate::error::ApiError;
use crate::handlers::utils::{parse_id, JsonBody, Validator};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products/reviews
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Review>> {
    Ok(ApiResponse::success(state.store.list_reviews().await?))
}

/// POST /products/reviews - Create a review and link it to its product
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewReview>,
) -> ApiResult<Review> {
    Validator::new().rating(body.rating_given).finish()?;

    // Both referenced rows must exist
    state.store.account_by_id(body.account_id).await?;
    state.store.product_by_id(body.product_id).await?;

    let mut uow = state.store.begin().await?;
    let review = uow.create_review(&body).await?;
    uow.commit().await?;

    info!("Created review {} for product {}", review.id, review.product_id);
    Ok(ApiResponse::success(review))
}

/// GET /products/reviews/:id
pub async fn get(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Review> {
    let id = parse_id(&raw_id)?;
    Ok(ApiResponse::success(state.store.review_by_id(id).await?))
}

/// PUT /products/reviews/:id - Change rating and text
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    JsonBody(body): JsonBody<ReviewUpdate>,
) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;
    Validator::new().rating(body.rating_given).finish()?;

    state.store.update_review(id, &body).await?;
    info!("Updated review {}", id);
    Ok(ApiResponse::updated(id))
}

/// DELETE /products/reviews/:id
pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Value> {
    let id = parse_id(&raw_id)?;

    let mut uow = state.store.begin().await?;
    uow.delete_review_links(ReviewScope::Review(id)).await?;
    if uow.delete_reviews(ReviewScope::Review(id)).await? == 0 {
        return Err(ApiError::not_found(format!("review {} not found", id)));
    }
    uow.commit().await?;

    info!("Deleted review {}", id);
    Ok(ApiResponse::deleted(id))
}
