use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use thiserror::Error;

const ABSENT_ACCOUNT_PASSWORD: &str = "no-such-account";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Argon2id hashing with a fresh random salt per password.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
    absent: OnceCell<String>,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
            absent: OnceCell::new(),
        }
    }
}

impl PasswordHashing {
    /// Custom cost parameters: memory in KiB, iterations, lanes.
    pub fn with_params(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, lanes, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            absent: OnceCell::new(),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// False on mismatch and on a stored hash that does not parse.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Pay one verify against a throwaway hash so a login for an unknown
    /// email costs the same as a wrong password.
    pub fn verify_absent(&self, password: &str) {
        let hash = self
            .absent
            .get_or_init(|| self.hash(ABSENT_ACCOUNT_PASSWORD).unwrap_or_default());
        self.verify(password, hash);
    }
}
