use serde::{Deserialize, Serialize};

use crate::storage::Record;

/// Console role carried in every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The configured bootstrap account. It has no directory record.
    Superuser,
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superuser => "superuser",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Invited but not yet allowed to sign in
    Pending,
    Active,
}

/// User status record as maintained by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    pub username: String,
    pub status: UserStatus,
    pub role: Role,
    /// Accounts (zones, projects) the user may act on
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, status: UserStatus, role: Role) -> Self {
        Self {
            username: username.into(),
            status,
            role,
            accounts: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

impl Record for UserRecord {
    const KIND: &'static str = "user";
    const VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Superuser).unwrap(), "\"superuser\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"viewer\"").unwrap(),
            Role::Viewer
        );
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_record_rejects_unknown_fields() {
        let json = r#"{"username":"bob","status":"active","role":"admin","accounts":[],"is_admin":true}"#;
        assert!(serde_json::from_str::<UserRecord>(json).is_err());

        let json = r#"{"username":"bob","status":"pending","role":"viewer"}"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert!(!user.is_active());
        assert!(user.accounts.is_empty());
    }
}
