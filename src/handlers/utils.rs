use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::Method,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

pub const MIN_PASSWORD_LEN: usize = 8;

/// JSON body decoded from the raw bytes. Malformed input is an `InvalidArgument`
/// regardless of the request's content type.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_argument(e.body_text()))?;
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::invalid_argument(e.to_string()))
    }
}

pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id(raw))
}

/// Optional query parameter; present but unparsable is an error.
pub fn query_param<T: FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ApiError> {
    params
        .get(name)
        .map(|raw| {
            raw.parse()
                .map_err(|_| ApiError::invalid_argument(format!("invalid {} given {}", name, raw)))
        })
        .transpose()
}

pub fn required_param<T: FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<T, ApiError> {
    query_param(params, name)?
        .ok_or_else(|| ApiError::invalid_argument(format!("missing {}", name)))
}

/// Collection paths have no id, so PUT there is an invalid id
pub async fn missing_id() -> ApiError {
    ApiError::invalid_id("")
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

/// Collects every failing field before reporting.
#[derive(Debug, Default)]
pub struct Validator {
    failures: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, failure: &str) -> &mut Self {
        if !ok {
            self.failures.push(failure.to_string());
        }
        self
    }

    pub fn email(&mut self, email: &str) -> &mut Self {
        self.check(EMAIL_PATTERN.is_match(email), "invalid email")
    }

    pub fn password(&mut self, password: &str) -> &mut Self {
        self.check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            "password needs to be at least 8 characters long",
        )
    }

    pub fn names(&mut self, first_name: &str, last_name: &str) -> &mut Self {
        self.check(!first_name.trim().is_empty(), "empty firstname")
            .check(!last_name.trim().is_empty(), "empty lastname")
    }

    pub fn price(&mut self, price: f64) -> &mut Self {
        self.check(price.is_finite() && price >= 0.0, "price must be a non-negative number")
    }

    pub fn quantity(&mut self, quantity: i32) -> &mut Self {
        self.check(quantity >= 1, "quantity must be at least 1")
    }

    pub fn rating(&mut self, rating: f64) -> &mut Self {
        self.check(rating.is_finite(), "ratingGiven must be a finite number")
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.failures)))
        }
    }
}
