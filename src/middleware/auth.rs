use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::UserType;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "jwt";

/// Authenticated account context decoded from the session token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthAccount {
    pub account_id: i32,
    pub user_type: UserType,
}

impl From<Claims> for AuthAccount {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.account_id,
            user_type: claims.user_type,
        }
    }
}

/// Admin-only gate for the account routes
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let account = authenticate(&state, request.headers()).and_then(authorize_admin);
    let account = account.map_err(deny(request.uri().path()))?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Owner-only gate for `/carts/:id`: the path id must be the caller's own account
pub async fn require_owner(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw_id = path.map(|Path(raw)| raw).unwrap_or_default();
    let account = authenticate(&state, request.headers())
        .and_then(|account| authorize_owner(account, &raw_id));
    let account = account.map_err(deny(request.uri().path()))?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

fn deny(path: &str) -> impl FnOnce(ApiError) -> ApiError + '_ {
    move |err| {
        if let ApiError::Unauthenticated(reason) | ApiError::Forbidden(reason) = &err {
            warn!("Denied {}: {}", path, reason);
        }
        err
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthAccount, ApiError> {
    let token = session_token(headers)
        .ok_or_else(|| ApiError::unauthenticated("missing session cookie"))?;
    let claims = state
        .tokens
        .validate(&token)
        .map_err(|e| ApiError::unauthenticated(e.to_string()))?;
    Ok(claims.into())
}

pub fn authorize_admin(account: AuthAccount) -> Result<AuthAccount, ApiError> {
    if account.user_type != UserType::Admin {
        return Err(ApiError::forbidden(format!(
            "account {} is not an admin",
            account.account_id
        )));
    }
    Ok(account)
}

pub fn authorize_owner(account: AuthAccount, raw_id: &str) -> Result<AuthAccount, ApiError> {
    let owner: i32 = raw_id
        .parse()
        .map_err(|_| ApiError::forbidden(format!("unparsable account id '{}'", raw_id)))?;

    if account.user_type != UserType::Regular {
        return Err(ApiError::forbidden(format!(
            "account {} is not a regular account",
            account.account_id
        )));
    }
    if account.account_id != owner {
        return Err(ApiError::forbidden(format!(
            "account {} does not own cart of account {}",
            account.account_id, owner
        )));
    }
    Ok(account)
}

/// Extract the session token from the `Cookie` header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for a freshly issued token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
