use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::macros::string_enum;

string_enum! {
    pub enum StaffRole: "staff role" {
        Admin => "admin",
        Physician => "physician",
        Nurse => "nurse",
        Registrar => "registrar",
    }
}

/// A care-provider or administrative account.
///
/// The password hash is kept out of this type; see [`StaffCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: StaffRole,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Staff {
    pub fn has_role(&self, role: StaffRole) -> bool {
        self.role == role
    }
}

/// A staff account together with its stored Argon2 hash, used at login.
#[derive(Debug, Clone)]
pub struct StaffCredentials {
    pub staff: Staff,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub password_hash: String,
}

impl NewStaff {
    pub fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.len() < 3 {
            return Err(CoreError::invalid_field(
                "username",
                "must be at least 3 characters",
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(CoreError::invalid_field(
                "username",
                "may only contain letters, digits, '.', '_' and '-'",
            ));
        }
        if self.display_name.trim().is_empty() {
            return Err(CoreError::invalid_field("display_name", "must not be blank"));
        }
        if let Some(ref email) = self.email
            && !email.contains('@')
        {
            return Err(CoreError::invalid_field("email", "must contain '@'"));
        }
        Ok(())
    }

    pub fn into_credentials(self, id: Uuid, now: OffsetDateTime) -> StaffCredentials {
        StaffCredentials {
            staff: Staff {
                id,
                username: self.username.trim().to_string(),
                display_name: self.display_name.trim().to_string(),
                email: self.email,
                role: self.role,
                active: true,
                created_at: now,
            },
            password_hash: self.password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::datetime;

    fn new_staff(username: &str) -> NewStaff {
        NewStaff {
            username: username.into(),
            display_name: "Dr. House".into(),
            email: Some("house@example.org".into()),
            role: StaffRole::Physician,
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[test]
    fn test_role_codes() {
        assert_eq!(StaffRole::from_str("registrar").unwrap(), StaffRole::Registrar);
        assert!(StaffRole::from_str("janitor").is_err());
        assert_eq!(StaffRole::ALL.len(), 4);
    }

    #[test]
    fn test_validate_username() {
        assert!(new_staff("g.house").validate().is_ok());
        assert!(new_staff("gh").validate().is_err());
        assert!(new_staff("g house").validate().is_err());
    }

    #[test]
    fn test_staff_serialization_has_no_hash() {
        let creds = new_staff("g.house").into_credentials(
            Uuid::new_v4(),
            datetime!(2026-01-01 00:00 UTC),
        );
        let json = serde_json::to_value(&creds.staff).unwrap();
        assert_eq!(json["role"], "physician");
        assert!(json.get("password_hash").is_none());
    }
}
