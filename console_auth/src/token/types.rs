use serde::{Deserialize, Serialize};

use crate::storage::Record;
use crate::userdb::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claim set shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Present on refresh tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Tokens handed out after a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of exchanging a refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub access_token: String,
    /// Accounts listed on the user's directory record. Empty for the superuser.
    pub accounts: Vec<String>,
}

/// Sentinel stored under `REVOKED_RT:{jti}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RevokedToken {
    pub(super) revoked_at: i64,
}

impl Record for RevokedToken {
    const KIND: &'static str = "revoked_refresh_token";
    const VERSION: u32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_wire_format() {
        let claims = TokenClaims {
            sub: "bob".to_string(),
            role: Role::Admin,
            iat: 1,
            exp: 2,
            token_type: TokenType::Access,
            jti: None,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "access");
        assert_eq!(json["role"], "admin");
        assert!(json.get("jti").is_none());

        let refresh = r#"{"sub":"bob","role":"viewer","iat":1,"exp":2,"type":"refresh","jti":"rt-42"}"#;
        let parsed: TokenClaims = serde_json::from_str(refresh).unwrap();
        assert_eq!(parsed.token_type, TokenType::Refresh);
        assert_eq!(parsed.jti.as_deref(), Some("rt-42"));
    }
}
