// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Catalogue browsing, reviews, login and health. Product and review
// mutation is also reachable here without a session.

pub mod categories;
pub mod health;
pub mod login;
pub mod products;
pub mod reviews;
