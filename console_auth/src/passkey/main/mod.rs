mod attestation;
mod auth;
mod challenge;
mod register;
#[cfg(test)]
pub(crate) mod test_utils;
mod types;

pub use challenge::ChallengeStore;
pub use types::{
    AuthenticationOptions, AuthenticatorResponse, RegisterCredential, RegistrationOptions,
};

pub(crate) use auth::{finish_authentication, start_authentication};
pub(crate) use register::{finish_registration, start_registration};
