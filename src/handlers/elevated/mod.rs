// handlers/elevated/mod.rs - Admin-gated handlers
//
// Everything here sits behind `require_admin`.

pub mod accounts;
