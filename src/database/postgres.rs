use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, AccountUpdate, Cart, CartLine, Category, NewAccount, NewProduct, NewReview, Product,
    Review, ReviewUpdate,
};
use crate::database::store::{
    cart_not_found, line_exists, line_missing, ProductSearch, Result, ReviewScope, Store,
    UnitOfWork,
};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS account (
        id SERIAL PRIMARY KEY,
        first_name VARCHAR(100) NOT NULL,
        last_name VARCHAR(100) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        encrypted_password TEXT NOT NULL,
        user_type VARCHAR(20) NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS product (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        measurements TEXT NOT NULL,
        description TEXT NOT NULL,
        packaging TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS review (
        id SERIAL PRIMARY KEY,
        account_id INTEGER NOT NULL REFERENCES account(id),
        product_id INTEGER NOT NULL REFERENCES product(id),
        rating_given DOUBLE PRECISION NOT NULL,
        text TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS category (
        name VARCHAR(100) PRIMARY KEY
    )"#,
    r#"CREATE TABLE IF NOT EXISTS product_category (
        product_id INTEGER NOT NULL REFERENCES product(id),
        category_name VARCHAR(100) NOT NULL REFERENCES category(name),
        PRIMARY KEY (product_id, category_name)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS product_review (
        product_id INTEGER NOT NULL REFERENCES product(id),
        review_id INTEGER NOT NULL REFERENCES review(id),
        PRIMARY KEY (product_id, review_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS cart (
        id SERIAL PRIMARY KEY,
        account_id INTEGER NOT NULL UNIQUE REFERENCES account(id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS cart_product (
        cart_id INTEGER NOT NULL REFERENCES cart(id),
        product_id INTEGER NOT NULL REFERENCES product(id),
        quantity INTEGER NOT NULL,
        PRIMARY KEY (cart_id, product_id)
    )"#,
];

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, encrypted_password, user_type";
const PRODUCT_COLUMNS: &str = "id, name, price, measurements, description, packaging";
const REVIEW_COLUMNS: &str = "id, account_id, product_id, rating_given, text";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing tables. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready ({} tables)", SCHEMA.len());
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {} FROM account ORDER BY id", ACCOUNT_COLUMNS);
        Ok(sqlx::query_as::<_, Account>(&sql).fetch_all(&self.pool).await?)
    }

    async fn account_by_id(&self, id: i32) -> Result<Account> {
        let sql = format!("SELECT {} FROM account WHERE id = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("account {} not found", id)))
    }

    async fn account_by_email(&self, email: &str) -> Result<Account> {
        debug!("Looking up account by email");
        let sql = format!("SELECT {} FROM account WHERE email = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, Account>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                DatabaseError::not_found(format!("account with email {} not found", email))
            })
    }

    async fn update_account(&self, id: i32, update: &AccountUpdate) -> Result<()> {
        let result = sqlx::query(
            "UPDATE account SET first_name = $2, last_name = $3, email = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("account {} not found", id)));
        }
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        let sql = format!(
            "INSERT INTO product (name, price, measurements, description, packaging) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.measurements)
            .bind(&product.description)
            .bind(&product.packaging)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_product(&self, id: i32, product: &NewProduct) -> Result<()> {
        let result = sqlx::query(
            "UPDATE product SET name = $2, price = $3, measurements = $4, description = $5, \
             packaging = $6 WHERE id = $1",
        )
        .bind(id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.measurements)
        .bind(&product.description)
        .bind(&product.packaging)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("product {} not found", id)));
        }
        Ok(())
    }

    async fn product_by_id(&self, id: i32) -> Result<Product> {
        let sql = format!("SELECT {} FROM product WHERE id = $1", PRODUCT_COLUMNS);
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("product {} not found", id)))
    }

    async fn newest_products(&self, count: i64) -> Result<Vec<Product>> {
        let sql = format!("SELECT {} FROM product ORDER BY id DESC LIMIT $1", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(count)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search_products(&self, search: &ProductSearch) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM product \
             WHERE strpos(lower(name), lower($1)) > 0 AND price >= $2 AND price <= $3 \
             ORDER BY id OFFSET $4 LIMIT $5",
            PRODUCT_COLUMNS
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(&search.name)
            .bind(search.price_from)
            .bind(search.price_to)
            .bind(search.offset())
            .bind(search.window())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        let sql = format!("SELECT {} FROM review ORDER BY id", REVIEW_COLUMNS);
        Ok(sqlx::query_as::<_, Review>(&sql).fetch_all(&self.pool).await?)
    }

    async fn review_by_id(&self, id: i32) -> Result<Review> {
        let sql = format!("SELECT {} FROM review WHERE id = $1", REVIEW_COLUMNS);
        sqlx::query_as::<_, Review>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found(format!("review {} not found", id)))
    }

    async fn update_review(&self, id: i32, update: &ReviewUpdate) -> Result<()> {
        let result = sqlx::query("UPDATE review SET rating_given = $2, text = $3 WHERE id = $1")
            .bind(id)
            .bind(update.rating_given)
            .bind(&update.text)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("review {} not found", id)));
        }
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(sqlx::query_as::<_, Category>("SELECT name FROM category ORDER BY name")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        sqlx::query("INSERT INTO category (name) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(Category { name: name.to_string() })
    }

    async fn link_product_category(&self, product_id: i32, category: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO product_category (product_id, category_name) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(product_id)
        .bind(category)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn cart_by_account(&self, account_id: i32) -> Result<Cart> {
        sqlx::query_as::<_, Cart>("SELECT id, account_id FROM cart WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| cart_not_found(account_id))
    }

    async fn cart_lines(&self, cart_id: i32) -> Result<Vec<CartLine>> {
        Ok(sqlx::query_as::<_, CartLine>(
            "SELECT cart_id, product_id, quantity FROM cart_product \
             WHERE cart_id = $1 ORDER BY product_id",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn add_cart_line(&self, line: &CartLine) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO cart_product (cart_id, product_id, quantity) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(line.cart_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(line_exists(line.cart_id, line.product_id));
        }
        Ok(())
    }

    async fn update_cart_line(&self, line: &CartLine) -> Result<()> {
        let result = sqlx::query(
            "UPDATE cart_product SET quantity = $3 WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(line.cart_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(line_missing(line.cart_id, line.product_id));
        }
        Ok(())
    }

    async fn delete_cart_line(&self, cart_id: i32, product_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_product WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(line_missing(cart_id, product_id));
        }
        Ok(())
    }
}

/// Unit of work over one Postgres transaction. Dropping it uncommitted rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn create_account(&mut self, account: &NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO account (first_name, last_name, email, encrypted_password, user_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.encrypted_password)
            .bind(account.user_type.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn create_cart(&mut self, account_id: i32) -> Result<Cart> {
        sqlx::query_as::<_, Cart>("INSERT INTO cart (account_id) VALUES ($1) RETURNING id, account_id")
            .bind(account_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn create_review(&mut self, review: &NewReview) -> Result<Review> {
        let sql = format!(
            "INSERT INTO review (account_id, product_id, rating_given, text) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            REVIEW_COLUMNS
        );
        let created = sqlx::query_as::<_, Review>(&sql)
            .bind(review.account_id)
            .bind(review.product_id)
            .bind(review.rating_given)
            .bind(&review.text)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        sqlx::query("INSERT INTO product_review (product_id, review_id) VALUES ($1, $2)")
            .bind(created.product_id)
            .bind(created.id)
            .execute(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        Ok(created)
    }

    async fn cart_by_account(&mut self, account_id: i32) -> Result<Cart> {
        sqlx::query_as::<_, Cart>("SELECT id, account_id FROM cart WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| cart_not_found(account_id))
    }

    async fn delete_cart_lines(&mut self, cart_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_product WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_cart(&mut self, cart_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("cart {} not found", cart_id)));
        }
        Ok(())
    }

    async fn delete_review_links(&mut self, scope: ReviewScope) -> Result<u64> {
        let (sql, id) = match scope {
            ReviewScope::Review(id) => ("DELETE FROM product_review WHERE review_id = $1", id),
            ReviewScope::Product(id) => ("DELETE FROM product_review WHERE product_id = $1", id),
            ReviewScope::Account(id) => (
                "DELETE FROM product_review WHERE review_id IN \
                 (SELECT id FROM review WHERE account_id = $1)",
                id,
            ),
        };
        let result = sqlx::query(sql).bind(id).execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn delete_reviews(&mut self, scope: ReviewScope) -> Result<u64> {
        let (sql, id) = match scope {
            ReviewScope::Review(id) => ("DELETE FROM review WHERE id = $1", id),
            ReviewScope::Product(id) => ("DELETE FROM review WHERE product_id = $1", id),
            ReviewScope::Account(id) => ("DELETE FROM review WHERE account_id = $1", id),
        };
        let result = sqlx::query(sql)
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn delete_category_links(&mut self, product_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM product_category WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_account(&mut self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("account {} not found", id)));
        }
        Ok(())
    }

    async fn delete_product(&mut self, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("product {} not found", id)));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
