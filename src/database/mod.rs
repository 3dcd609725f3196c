pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{ProductSearch, ReviewScope, Store, UnitOfWork};
