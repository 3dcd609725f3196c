use std::sync::Arc;

use crate::auth::{PasswordHashing, TokenIssuer};
use crate::config::SecurityConfig;
use crate::database::Store;

/// Shared handles passed to every handler and gate
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenIssuer>,
    pub passwords: Arc<PasswordHashing>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, security: &SecurityConfig, passwords: PasswordHashing) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenIssuer::new(security)),
            passwords: Arc::new(passwords),
            cookie_secure: security.cookie_secure,
        }
    }
}
