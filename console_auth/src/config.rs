//! Central configuration for the console_auth crate
//!
//! Settings are read from the environment once and frozen into an immutable
//! [`Settings`] snapshot: defaults merged with whatever overrides are present.

use std::env;
use std::sync::LazyLock;

use thiserror::Error;

/// Route prefix for all console_auth endpoints
///
/// Default: "/auth"
pub static CONSOLE_AUTH_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    env::var("CONSOLE_AUTH_ROUTE_PREFIX").unwrap_or_else(|_| "/auth".to_string())
});

/// Upper bound for `REFRESH_TOKEN_TTL_DAYS`, ten years.
pub const MAX_REFRESH_TOKEN_TTL_DAYS: i64 = 3650;

static SETTINGS: LazyLock<Result<Settings, SettingsError>> =
    LazyLock::new(|| Settings::default().merge(SettingsOverrides::from_env()));

/// Returns the process-wide settings snapshot.
pub(crate) fn settings() -> Result<&'static Settings, SettingsError> {
    SETTINGS.as_ref().map_err(Clone::clone)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Expected `clientDataJSON.origin`
    pub origin: String,
    /// Relying party id, the host part of `origin`
    pub rp_id: String,
    pub rp_name: String,
    /// Ceremony timeout hint for the browser, in milliseconds
    pub timeout: u32,
    pub user_verification: String,
    pub attestation: String,
    pub refresh_token_ttl_days: i64,
    /// Username that authenticates as `superuser` without a directory record
    pub superuser: String,
    /// HS256 signing secret. Token operations fail with a configuration
    /// error while this is unset.
    pub jwt_secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            rp_id: "localhost".to_string(),
            rp_name: "Console".to_string(),
            timeout: 60000,
            user_verification: "preferred".to_string(),
            attestation: "none".to_string(),
            refresh_token_ttl_days: 7,
            superuser: "admin".to_string(),
            jwt_secret: None,
        }
    }
}

/// Partial settings, each `Some` replacing the corresponding default.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub origin: Option<String>,
    pub rp_name: Option<String>,
    pub timeout: Option<String>,
    pub user_verification: Option<String>,
    pub attestation: Option<String>,
    pub refresh_token_ttl_days: Option<String>,
    pub superuser: Option<String>,
    pub jwt_secret: Option<String>,
}

impl SettingsOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            origin: lookup("ORIGIN"),
            rp_name: lookup("PASSKEY_RP_NAME"),
            timeout: lookup("PASSKEY_TIMEOUT"),
            user_verification: lookup("PASSKEY_USER_VERIFICATION"),
            attestation: lookup("PASSKEY_ATTESTATION"),
            refresh_token_ttl_days: lookup("REFRESH_TOKEN_TTL_DAYS"),
            superuser: lookup("CONSOLE_SUPERUSER"),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
        }
    }
}

impl Settings {
    /// Produce a new snapshot with `overrides` applied on top of `self`.
    pub fn merge(self, overrides: SettingsOverrides) -> Result<Self, SettingsError> {
        let origin = overrides
            .origin
            .map(|o| o.trim_end_matches('/').to_string())
            .unwrap_or(self.origin);
        let rp_id = rp_id_from_origin(&origin)?;
        let rp_name = overrides.rp_name.unwrap_or(self.rp_name);

        let timeout = match overrides.timeout {
            None => self.timeout,
            Some(v) => v.parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!("Invalid PASSKEY_TIMEOUT: {}. Using default {}", v, self.timeout);
                self.timeout
            }),
        };

        let user_verification = match overrides.user_verification {
            None => self.user_verification,
            Some(v) => match v.to_lowercase().as_str() {
                "required" => "required".to_string(),
                "preferred" => "preferred".to_string(),
                "discouraged" => "discouraged".to_string(),
                _ => {
                    tracing::warn!(
                        "Invalid user verification: {}. Using default '{}'",
                        v,
                        self.user_verification
                    );
                    self.user_verification
                }
            },
        };

        let attestation = match overrides.attestation {
            None => self.attestation,
            Some(v) => match v.to_lowercase().as_str() {
                "none" => "none".to_string(),
                "direct" => "direct".to_string(),
                "indirect" => "indirect".to_string(),
                invalid => {
                    tracing::warn!(
                        "Invalid attestation: {}. Using default '{}'",
                        invalid,
                        self.attestation
                    );
                    self.attestation
                }
            },
        };

        let refresh_token_ttl_days = match overrides.refresh_token_ttl_days {
            None => self.refresh_token_ttl_days,
            Some(v) => match v.parse::<i64>() {
                Ok(days) if (1..=MAX_REFRESH_TOKEN_TTL_DAYS).contains(&days) => days,
                _ => {
                    return Err(SettingsError::Invalid {
                        name: "REFRESH_TOKEN_TTL_DAYS",
                        reason: format!(
                            "expected 1 to {MAX_REFRESH_TOKEN_TTL_DAYS} days, got '{v}'"
                        ),
                    });
                }
            },
        };

        Ok(Self {
            origin,
            rp_id,
            rp_name,
            timeout,
            user_verification,
            attestation,
            refresh_token_ttl_days,
            superuser: overrides.superuser.unwrap_or(self.superuser),
            jwt_secret: overrides.jwt_secret.or(self.jwt_secret),
        })
    }
}

fn rp_id_from_origin(origin: &str) -> Result<String, SettingsError> {
    let url = url::Url::parse(origin).map_err(|e| SettingsError::Invalid {
        name: "ORIGIN",
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "https" | "http" => {}
        scheme => {
            return Err(SettingsError::Invalid {
                name: "ORIGIN",
                reason: format!("unsupported scheme '{scheme}'"),
            });
        }
    }

    url.host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| SettingsError::Invalid {
            name: "ORIGIN",
            reason: "origin has no host".to_string(),
        })
}
