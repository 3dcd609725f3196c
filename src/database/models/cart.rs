use serde::Serialize;
use sqlx::FromRow;

use super::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Cart {
    #[serde(rename = "cartID")]
    pub id: i32,
    #[serde(rename = "userID")]
    pub account_id: i32,
}

/// One product in a cart; (cart_id, product_id) is the key.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CartLine {
    #[serde(rename = "cartID")]
    pub cart_id: i32,
    #[serde(rename = "prodID")]
    pub product_id: i32,
    pub quantity: i32,
}

/// Cart contents as returned to the owner: the full product plus its quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductQuantity {
    pub product: Product,
    pub quantity: i32,
}
