// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no session) → Protected (owner session) → Elevated (admin session)
pub mod public;    // Catalogue, reviews, login, health
pub mod protected; // Carts, owner only
pub mod elevated;  // Accounts, admin only

pub mod utils;
