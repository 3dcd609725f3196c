// handlers/protected/mod.rs - Owner-gated handlers
//
// Routes here sit behind `require_owner`: a valid session for a Regular
// account whose id matches the path.

pub mod carts;
