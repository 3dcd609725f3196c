use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Successful handler output, serialized as the bare JSON body with 200 OK
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn updated(id: i32) -> Self {
        Self::success(json!({ "updated": id }))
    }

    pub fn deleted(id: i32) -> Self {
        Self::success(json!({ "deleted": id }))
    }

    pub fn added(product_id: i32) -> Self {
        Self::success(json!({ "added": product_id }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(value) => (StatusCode::OK, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "failed to serialize response" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
