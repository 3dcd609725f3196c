/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Account role. Decoded once from storage or token claims; never compared as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserType {
    Regular,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Regular => "Regular",
            UserType::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regular" => Ok(UserType::Regular),
            "Admin" => Ok(UserType::Admin),
            other => Err(format!("unknown user type '{}'", other)),
        }
    }
}
