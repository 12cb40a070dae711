mod errors;
mod main;
mod storage;
mod types;

pub use errors::PasskeyError;

pub use main::{
    AuthenticationOptions, AuthenticatorResponse, ChallengeStore, RegisterCredential,
    RegistrationOptions,
};

pub use storage::CredentialRegistry;
pub use types::{CeremonyType, ChallengeRecord, CredentialView, StoredCredential};

pub(crate) use main::{
    finish_authentication, finish_registration, start_authentication, start_registration,
};

#[cfg(test)]
pub(crate) use main::test_utils::SoftAuthenticator;
