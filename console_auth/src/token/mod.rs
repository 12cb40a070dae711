mod errors;
mod issuer;
mod revocation;
mod types;

pub use errors::TokenError;
pub use issuer::TokenIssuer;
pub use revocation::RevocationLedger;
pub use types::{RefreshOutcome, TokenClaims, TokenPair, TokenType};

#[cfg(test)]
pub(crate) use issuer::sign;
