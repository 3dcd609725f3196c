use thiserror::Error;
use tracing::info;

use crate::auth::{PasswordError, PasswordHashing};
use crate::config::SeedConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewAccount, NewProduct};
use crate::database::store::{ProductSearch, Store};
use crate::types::UserType;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

pub const DEFAULT_CATEGORIES: &[&str] = &["Beds", "Chairs", "Lighting", "Sofas", "Storage", "Tables"];

// name, price, measurements, description, packaging, category
const SAMPLE_PRODUCTS: &[(&str, f64, &str, &str, &str, &str)] = &[
    ("Oak Dining Table", 349.0, "180x90x75 cm", "Solid oak table for six", "2 boxes", "Tables"),
    ("Walnut Side Table", 89.5, "45x45x55 cm", "Round side table with shelf", "1 box", "Tables"),
    ("Linen Armchair", 229.0, "78x82x90 cm", "Upholstered armchair in natural linen", "1 box", "Chairs"),
    ("Stacking Chair", 39.9, "44x50x80 cm", "Lightweight stackable chair", "1 box", "Chairs"),
    ("Three-Seat Sofa", 799.0, "220x95x85 cm", "Deep-seated sofa with removable covers", "3 boxes", "Sofas"),
    ("Queen Bed Frame", 420.0, "160x200x40 cm", "Pine bed frame with slatted base", "2 boxes", "Beds"),
    ("Bookcase", 129.0, "80x30x200 cm", "Five-shelf bookcase", "1 box", "Storage"),
    ("Floor Lamp", 59.0, "30x30x160 cm", "Arc floor lamp with fabric shade", "1 box", "Lighting"),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub admin_created: bool,
}

/// Populate an empty catalogue and create the configured Admin account.
/// Each part is skipped when its data already exists.
pub async fn seed(
    store: &dyn Store,
    passwords: &PasswordHashing,
    config: &SeedConfig,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    if store.list_categories().await?.is_empty() {
        for name in DEFAULT_CATEGORIES {
            store.create_category(name).await?;
        }
        summary.categories = DEFAULT_CATEGORIES.len();
    }

    let existing = store
        .search_products(&ProductSearch { limit: 1, ..Default::default() })
        .await?;
    if existing.is_empty() {
        for (name, price, measurements, description, packaging, category) in SAMPLE_PRODUCTS {
            let product = store
                .create_product(&NewProduct {
                    name: name.to_string(),
                    price: *price,
                    measurements: measurements.to_string(),
                    description: description.to_string(),
                    packaging: packaging.to_string(),
                })
                .await?;
            store.link_product_category(product.id, category).await?;
        }
        summary.products = SAMPLE_PRODUCTS.len();
    }

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        summary.admin_created = seed_admin(store, passwords, email, password).await?;
    }

    info!(
        "Seeded {} categories, {} products, admin created: {}",
        summary.categories, summary.products, summary.admin_created
    );
    Ok(summary)
}

async fn seed_admin(
    store: &dyn Store,
    passwords: &PasswordHashing,
    email: &str,
    password: &str,
) -> Result<bool, SeedError> {
    match store.account_by_email(email).await {
        Ok(_) => return Ok(false),
        Err(DatabaseError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let encrypted_password = passwords.hash(password)?;
    let mut uow = store.begin().await?;
    let account = uow
        .create_account(&NewAccount {
            first_name: "Store".to_string(),
            last_name: "Admin".to_string(),
            email: email.to_string(),
            encrypted_password,
            user_type: UserType::Admin,
        })
        .await?;
    uow.create_cart(account.id).await?;
    uow.commit().await?;

    info!("Created admin account {}", account.id);
    Ok(true)
}
