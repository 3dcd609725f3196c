use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::types::UserType;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub encrypted_password: String,
    pub user_type: UserType,
}

// user_type is stored as varchar and decoded into the closed enum here
impl<'r> FromRow<'r, PgRow> for Account {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let user_type: String = row.try_get("user_type")?;
        let user_type = user_type
            .parse::<UserType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "user_type".to_string(),
                source: e.into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            encrypted_password: row.try_get("encrypted_password")?,
            user_type,
        })
    }
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub encrypted_password: String,
    pub user_type: UserType,
}

/// Mutable profile fields. Password and role are not changed through updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl Account {
    pub fn from_new(id: i32, new: &NewAccount) -> Self {
        Self {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            email: new.email.clone(),
            encrypted_password: new.encrypted_password.clone(),
            user_type: new.user_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let account = Account {
            id: 7,
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            encrypted_password: "$argon2id$...".into(),
            user_type: UserType::Regular,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["firstName"], "A");
        assert_eq!(json["userType"], "Regular");
        assert!(json.get("encryptedPassword").is_none());
    }
}
