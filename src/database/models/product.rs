use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub measurements: String,
    pub description: String,
    pub packaging: String,
}

/// Body shape for both product create and update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub measurements: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub packaging: String,
}

impl Product {
    pub fn from_new(id: i32, new: &NewProduct) -> Self {
        Self {
            id,
            name: new.name.clone(),
            price: new.price,
            measurements: new.measurements.clone(),
            description: new.description.clone(),
            packaging: new.packaging.clone(),
        }
    }
}
