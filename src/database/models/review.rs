use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Review {
    pub id: i32,
    #[serde(rename = "accID")]
    pub account_id: i32,
    #[serde(rename = "prodID")]
    pub product_id: i32,
    #[serde(rename = "ratingGiven")]
    pub rating_given: f64,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    #[serde(rename = "accID")]
    pub account_id: i32,
    #[serde(rename = "prodID")]
    pub product_id: i32,
    #[serde(rename = "ratingGiven", default)]
    pub rating_given: f64,
    #[serde(default)]
    pub text: String,
}

/// Only rating and text change on update; account and product stay fixed.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewUpdate {
    #[serde(rename = "ratingGiven", default)]
    pub rating_given: f64,
    #[serde(default)]
    pub text: String,
}

impl Review {
    pub fn from_new(id: i32, new: &NewReview) -> Self {
        Self {
            id,
            account_id: new.account_id,
            product_id: new.product_id,
            rating_given: new.rating_given,
            text: new.text.clone(),
        }
    }
}
