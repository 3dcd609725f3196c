// handlers/public/login.rs - POST /login

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::utils::{JsonBody, Validator};
use crate::middleware::auth::session_cookie;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /login - Verify credentials and set the session cookie
///
/// An unknown email and a wrong password both answer `not authenticated`.
pub async fn post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Response, ApiError> {
    Validator::new().email(&body.email).finish()?;

    let account = match state.store.account_by_email(&body.email).await {
        Ok(account) => account,
        Err(DatabaseError::NotFound(_)) => {
            warn!("Login for unknown email");
            state.passwords.verify_absent(&body.password);
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    if !state.passwords.verify(&body.password, &account.encrypted_password) {
        warn!("Login with wrong password for account {}", account.id);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&account)?;
    let cookie = session_cookie(&token, state.tokens.lifetime_secs(), state.cookie_secure);
    info!("Account {} logged in", account.id);

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success("Login successful"),
    )
        .into_response())
}
