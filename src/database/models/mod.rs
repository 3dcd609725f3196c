pub mod account;
pub mod cart;
pub mod category;
pub mod product;
pub mod review;

pub use account::{Account, AccountUpdate, NewAccount};
pub use cart::{Cart, CartLine, ProductQuantity};
pub use category::Category;
pub use product::{NewProduct, Product};
pub use review::{NewReview, Review, ReviewUpdate};
