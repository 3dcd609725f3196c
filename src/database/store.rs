use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, AccountUpdate, Cart, CartLine, Category, NewAccount, NewProduct, NewReview, Product,
    Review, ReviewUpdate,
};

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Product listing filter. `skip` and `limit` form a 1-based inclusive row range
/// over matches ordered by ascending id: `skip=1, limit=5` is rows 1 through 5.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSearch {
    pub name: String,
    pub price_from: f64,
    pub price_to: f64,
    pub skip: i64,
    pub limit: i64,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            name: String::new(),
            price_from: 0.0,
            price_to: f64::MAX,
            skip: 1,
            limit: i32::MAX as i64,
        }
    }
}

impl ProductSearch {
    /// Rows to skip before the window starts
    pub fn offset(&self) -> i64 {
        self.skip.saturating_sub(1).max(0)
    }

    /// Number of rows in the window; zero when `limit < skip`
    pub fn window(&self) -> i64 {
        self.limit.saturating_sub(self.skip).saturating_add(1).max(0)
    }

    pub fn matches(&self, product: &Product) -> bool {
        product.price >= self.price_from
            && product.price <= self.price_to
            && product.name.to_lowercase().contains(&self.name.to_lowercase())
    }
}

/// Which reviews a cascading delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewScope {
    Review(i32),
    Product(i32),
    Account(i32),
}

/// Persistence interface for every resource. Built once at startup and shared
/// through the application state.
#[async_trait]
pub trait Store: Send + Sync {
    /// Start a unit of work for a multi-step write. Dropping it uncommitted rolls back.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;

    async fn health_check(&self) -> Result<()>;

    // Accounts
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn account_by_id(&self, id: i32) -> Result<Account>;
    async fn account_by_email(&self, email: &str) -> Result<Account>;
    async fn update_account(&self, id: i32, update: &AccountUpdate) -> Result<()>;

    // Products
    async fn create_product(&self, product: &NewProduct) -> Result<Product>;
    async fn update_product(&self, id: i32, product: &NewProduct) -> Result<()>;
    async fn product_by_id(&self, id: i32) -> Result<Product>;
    async fn newest_products(&self, count: i64) -> Result<Vec<Product>>;
    async fn search_products(&self, search: &ProductSearch) -> Result<Vec<Product>>;

    // Reviews
    async fn list_reviews(&self) -> Result<Vec<Review>>;
    async fn review_by_id(&self, id: i32) -> Result<Review>;
    async fn update_review(&self, id: i32, update: &ReviewUpdate) -> Result<()>;

    // Categories
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, name: &str) -> Result<Category>;
    async fn link_product_category(&self, product_id: i32, category: &str) -> Result<()>;

    // Carts
    async fn cart_by_account(&self, account_id: i32) -> Result<Cart>;
    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>>;
    async fn add_cart_line(&self, line: &CartLine) -> Result<()>;
    async fn update_cart_line(&self, line: &CartLine) -> Result<()>;
    async fn delete_cart_line(&self, cart_id: i32, product_id: i32) -> Result<()>;
}

/// Writes that must land together. Each step runs against the open unit;
/// nothing is visible to other callers until `commit`.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn create_account(&mut self, account: &NewAccount) -> Result<Account>;
    async fn create_cart(&mut self, account_id: i32) -> Result<Cart>;
    async fn create_review(&mut self, review: &NewReview) -> Result<Review>;

    async fn cart_by_account(&mut self, account_id: i32) -> Result<Cart>;
    async fn delete_cart_lines(&mut self, cart_id: i32) -> Result<u64>;
    async fn delete_cart(&mut self, cart_id: i32) -> Result<()>;

    /// Remove product-review links for the reviews in scope
    async fn delete_review_links(&mut self, scope: ReviewScope) -> Result<u64>;
    async fn delete_reviews(&mut self, scope: ReviewScope) -> Result<u64>;
    async fn delete_category_links(&mut self, product_id: i32) -> Result<u64>;

    async fn delete_account(&mut self, id: i32) -> Result<()>;
    async fn delete_product(&mut self, id: i32) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
    async fn rollback(self: Box<Self>) -> Result<()>;
}

pub(crate) fn cart_not_found(account_id: i32) -> DatabaseError {
    DatabaseError::not_found(format!("cart for account {} not found", account_id))
}

pub(crate) fn line_exists(cart_id: i32, product_id: i32) -> DatabaseError {
    DatabaseError::conflict(format!("product {} is already in cart {}", product_id, cart_id))
}

pub(crate) fn line_missing(cart_id: i32, product_id: i32) -> DatabaseError {
    DatabaseError::not_found(format!("product {} is not in cart {}", product_id, cart_id))
}
