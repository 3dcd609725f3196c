use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, AccountUpdate, Cart, CartLine, Category, NewAccount, NewProduct, NewReview, Product,
    Review, ReviewUpdate,
};
use crate::database::store::{
    cart_not_found, line_exists, line_missing, ProductSearch, Result, ReviewScope, Store,
    UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    accounts: BTreeMap<i32, Account>,
    products: BTreeMap<i32, Product>,
    reviews: BTreeMap<i32, Review>,
    // (product_id, review_id)
    review_links: BTreeSet<(i32, i32)>,
    categories: BTreeSet<String>,
    // (product_id, category)
    category_links: BTreeSet<(i32, String)>,
    carts: BTreeMap<i32, Cart>,
    // (cart_id, product_id) -> quantity
    cart_lines: BTreeMap<(i32, i32), i32>,
    next_account: i32,
    next_product: i32,
    next_review: i32,
    next_cart: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Tables {
    fn account(&self, id: i32) -> Result<&Account> {
        self.accounts
            .get(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("account {} not found", id)))
    }

    fn product(&self, id: i32) -> Result<&Product> {
        self.products
            .get(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("product {} not found", id)))
    }

    fn review(&self, id: i32) -> Result<&Review> {
        self.reviews
            .get(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("review {} not found", id)))
    }

    fn cart_by_account(&self, account_id: i32) -> Result<Cart> {
        self.carts
            .values()
            .find(|cart| cart.account_id == account_id)
            .cloned()
            .ok_or_else(|| cart_not_found(account_id))
    }

    fn email_taken(&self, email: &str, except: Option<i32>) -> Result<()> {
        let taken = self
            .accounts
            .values()
            .any(|account| account.email == email && Some(account.id) != except);
        if taken {
            return Err(DatabaseError::conflict(format!(
                "email {} is already registered",
                email
            )));
        }
        Ok(())
    }

    fn insert_account(&mut self, new: &NewAccount) -> Result<Account> {
        self.email_taken(&new.email, None)?;
        let id = next_id(&mut self.next_account);
        let account = Account::from_new(id, new);
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    fn insert_cart(&mut self, account_id: i32) -> Result<Cart> {
        self.account(account_id)?;
        if self.cart_by_account(account_id).is_ok() {
            return Err(DatabaseError::conflict(format!(
                "account {} already has a cart",
                account_id
            )));
        }
        let id = next_id(&mut self.next_cart);
        let cart = Cart { id, account_id };
        self.carts.insert(id, cart.clone());
        Ok(cart)
    }

    fn insert_review(&mut self, new: &NewReview) -> Result<Review> {
        self.account(new.account_id)?;
        self.product(new.product_id)?;
        let id = next_id(&mut self.next_review);
        let review = Review::from_new(id, new);
        self.reviews.insert(id, review.clone());
        self.review_links.insert((review.product_id, id));
        Ok(review)
    }

    fn reviews_in(&self, scope: ReviewScope) -> Vec<i32> {
        self.reviews
            .values()
            .filter(|review| match scope {
                ReviewScope::Review(id) => review.id == id,
                ReviewScope::Product(id) => review.product_id == id,
                ReviewScope::Account(id) => review.account_id == id,
            })
            .map(|review| review.id)
            .collect()
    }

    fn remove_review_links(&mut self, scope: ReviewScope) -> u64 {
        let before = self.review_links.len();
        match scope {
            ReviewScope::Product(product_id) => {
                self.review_links.retain(|(product, _)| *product != product_id)
            }
            _ => {
                let ids: BTreeSet<i32> = self.reviews_in(scope).into_iter().collect();
                self.review_links.retain(|(_, review)| !ids.contains(review))
            }
        }
        (before - self.review_links.len()) as u64
    }

    fn remove_reviews(&mut self, scope: ReviewScope) -> u64 {
        let ids = self.reviews_in(scope);
        for id in &ids {
            self.reviews.remove(id);
        }
        ids.len() as u64
    }

    /// Mirrors the foreign keys the Postgres schema enforces
    fn ensure_unreferenced_account(&self, id: i32) -> Result<()> {
        let referenced = self.carts.values().any(|cart| cart.account_id == id)
            || self.reviews.values().any(|review| review.account_id == id);
        if referenced {
            return Err(DatabaseError::conflict(format!(
                "account {} is still referenced",
                id
            )));
        }
        Ok(())
    }

    fn ensure_unreferenced_product(&self, id: i32) -> Result<()> {
        let referenced = self.reviews.values().any(|review| review.product_id == id)
            || self.review_links.iter().any(|(product, _)| *product == id)
            || self.category_links.iter().any(|(product, _)| *product == id)
            || self.cart_lines.keys().any(|(_, product)| *product == id);
        if referenced {
            return Err(DatabaseError::conflict(format!(
                "product {} is still referenced",
                id
            )));
        }
        Ok(())
    }
}

/// In-memory store for tests and `--in-memory` runs. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().write_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            tables: guard,
            snapshot: Some(snapshot),
        }))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.tables.read().await.accounts.values().cloned().collect())
    }

    async fn account_by_id(&self, id: i32) -> Result<Account> {
        self.tables.read().await.account(id).cloned()
    }

    async fn account_by_email(&self, email: &str) -> Result<Account> {
        debug!("Looking up account by email");
        self.tables
            .read()
            .await
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned()
            .ok_or_else(|| {
                DatabaseError::not_found(format!("account with email {} not found", email))
            })
    }

    async fn update_account(&self, id: i32, update: &AccountUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.account(id)?;
        tables.email_taken(&update.email, Some(id))?;
        if let Some(account) = tables.accounts.get_mut(&id) {
            account.first_name = update.first_name.clone();
            account.last_name = update.last_name.clone();
            account.email = update.email.clone();
        }
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_product);
        let created = Product::from_new(id, product);
        tables.products.insert(id, created.clone());
        Ok(created)
    }

    async fn update_product(&self, id: i32, product: &NewProduct) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.product(id)?;
        tables.products.insert(id, Product::from_new(id, product));
        Ok(())
    }

    async fn product_by_id(&self, id: i32) -> Result<Product> {
        self.tables.read().await.product(id).cloned()
    }

    async fn newest_products(&self, count: i64) -> Result<Vec<Product>> {
        let take = usize::try_from(count).unwrap_or(0);
        Ok(self
            .tables
            .read()
            .await
            .products
            .values()
            .rev()
            .take(take)
            .cloned()
            .collect())
    }

    async fn search_products(&self, search: &ProductSearch) -> Result<Vec<Product>> {
        let offset = usize::try_from(search.offset()).unwrap_or(usize::MAX);
        let window = usize::try_from(search.window()).unwrap_or(usize::MAX);
        Ok(self
            .tables
            .read()
            .await
            .products
            .values()
            .filter(|product| search.matches(product))
            .skip(offset)
            .take(window)
            .cloned()
            .collect())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        Ok(self.tables.read().await.reviews.values().cloned().collect())
    }

    async fn review_by_id(&self, id: i32) -> Result<Review> {
        self.tables.read().await.review(id).cloned()
    }

    async fn update_review(&self, id: i32, update: &ReviewUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found(format!("review {} not found", id)))?;
        review.rating_given = update.rating_given;
        review.text = update.text.clone();
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self
            .tables
            .read()
            .await
            .categories
            .iter()
            .map(|name| Category { name: name.clone() })
            .collect())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        self.tables.write().await.categories.insert(name.to_string());
        Ok(Category { name: name.to_string() })
    }

    async fn link_product_category(&self, product_id: i32, category: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.product(product_id)?;
        if !tables.categories.contains(category) {
            return Err(DatabaseError::conflict(format!(
                "category {} does not exist",
                category
            )));
        }
        tables
            .category_links
            .insert((product_id, category.to_string()));
        Ok(())
    }

    async fn cart_by_account(&self, account_id: i32) -> Result<Cart> {
        self.tables.read().await.cart_by_account(account_id)
    }

    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>> {
        Ok(self
            .tables
            .read()
            .await
            .cart_lines
            .range((cart_id, i32::MIN)..=(cart_id, i32::MAX))
            .map(|(&(cart_id, product_id), &quantity)| CartLine {
                cart_id,
                product_id,
                quantity,
            })
            .collect())
    }

    async fn add_cart_line(&self, line: &CartLine) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.product(line.product_id)?;
        let key = (line.cart_id, line.product_id);
        if tables.cart_lines.contains_key(&key) {
            return Err(line_exists(line.cart_id, line.product_id));
        }
        tables.cart_lines.insert(key, line.quantity);
        Ok(())
    }

    async fn update_cart_line(&self, line: &CartLine) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.cart_lines.get_mut(&(line.cart_id, line.product_id)) {
            Some(quantity) => {
                *quantity = line.quantity;
                Ok(())
            }
            None => Err(line_missing(line.cart_id, line.product_id)),
        }
    }

    async fn delete_cart_line(&self, cart_id: i32, product_id: i32) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .cart_lines
            .remove(&(cart_id, product_id))
            .map(|_| ())
            .ok_or_else(|| line_missing(cart_id, product_id))
    }
}

/// Holds the write lock for its whole lifetime. The snapshot taken at `begin`
/// is put back unless `commit` ran.
pub struct MemoryUnitOfWork {
    tables: OwnedRwLockWriteGuard<Tables>,
    snapshot: Option<Tables>,
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!("Rolling back in-memory unit of work");
            *self.tables = snapshot;
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn create_account(&mut self, account: &NewAccount) -> Result<Account> {
        self.tables.insert_account(account)
    }

    async fn create_cart(&mut self, account_id: i32) -> Result<Cart> {
        self.tables.insert_cart(account_id)
    }

    async fn create_review(&mut self, review: &NewReview) -> Result<Review> {
        self.tables.insert_review(review)
    }

    async fn cart_by_account(&mut self, account_id: i32) -> Result<Cart> {
        self.tables.cart_by_account(account_id)
    }

    async fn delete_cart_lines(&mut self, cart_id: i32) -> Result<u64> {
        let before = self.tables.cart_lines.len();
        self.tables.cart_lines.retain(|(cart, _), _| *cart != cart_id);
        Ok((before - self.tables.cart_lines.len()) as u64)
    }

    async fn delete_cart(&mut self, cart_id: i32) -> Result<()> {
        if self.tables.cart_lines.keys().any(|(cart, _)| *cart == cart_id) {
            return Err(DatabaseError::conflict(format!(
                "cart {} still has products",
                cart_id
            )));
        }
        self.tables
            .carts
            .remove(&cart_id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found(format!("cart {} not found", cart_id)))
    }

    async fn delete_review_links(&mut self, scope: ReviewScope) -> Result<u64> {
        Ok(self.tables.remove_review_links(scope))
    }

    async fn delete_reviews(&mut self, scope: ReviewScope) -> Result<u64> {
        Ok(self.tables.remove_reviews(scope))
    }

    async fn delete_category_links(&mut self, product_id: i32) -> Result<u64> {
        let before = self.tables.category_links.len();
        self.tables
            .category_links
            .retain(|(product, _)| *product != product_id);
        Ok((before - self.tables.category_links.len()) as u64)
    }

    async fn delete_account(&mut self, id: i32) -> Result<()> {
        self.tables.account(id)?;
        self.tables.ensure_unreferenced_account(id)?;
        self.tables.accounts.remove(&id);
        Ok(())
    }

    async fn delete_product(&mut self, id: i32) -> Result<()> {
        self.tables.product(id)?;
        self.tables.ensure_unreferenced_product(id)?;
        self.tables.products.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut unit = self;
        unit.snapshot = None;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        // Drop restores the snapshot
        Ok(())
    }
}
