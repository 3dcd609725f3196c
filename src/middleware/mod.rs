pub mod auth;
pub mod response;

pub use auth::{require_admin, require_owner, AuthAccount, SESSION_COOKIE};
pub use response::{ApiResponse, ApiResult};
