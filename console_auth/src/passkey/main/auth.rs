use ring::signature::UnparsedPublicKey;

use crate::config::settings;
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::CredentialRegistry;
use crate::passkey::types::CeremonyType;
use crate::utils::base64url_decode;

use super::challenge::ChallengeStore;
use super::types::{
    AuthenticationOptions, AuthenticatorData, AuthenticatorResponse, CredentialDescriptor,
    ParsedClientData,
};

/// Build request options for `username`. Fails with `NotFound` when the user
/// has no registered credentials.
pub(crate) async fn start_authentication(
    username: &str,
) -> Result<AuthenticationOptions, PasskeyError> {
    let settings = settings()?;
    let credentials = CredentialRegistry::credentials(username).await?;
    if credentials.is_empty() {
        return Err(PasskeyError::NotFound(
            "No passkeys registered for user".to_string(),
        ));
    }

    let challenge = ChallengeStore::mint(username, CeremonyType::Authentication).await?;

    let options = AuthenticationOptions {
        challenge,
        timeout: settings.timeout,
        rp_id: settings.rp_id.clone(),
        allow_credentials: credentials
            .into_iter()
            .map(|c| CredentialDescriptor {
                type_: "public-key".to_string(),
                id: c.credential_id,
                transports: c.transports,
            })
            .collect(),
        user_verification: settings.user_verification.clone(),
    };

    tracing::debug!(
        username,
        allowed = options.allow_credentials.len(),
        "Authentication options created"
    );
    Ok(options)
}

/// Verify an assertion and return the username the challenge was bound to.
///
/// The identity comes from the consumed challenge record, never from the
/// response itself.
pub(crate) async fn finish_authentication(
    auth_response: &AuthenticatorResponse,
) -> Result<String, PasskeyError> {
    let settings = settings()?;

    let client_data = ParsedClientData::from_base64(&auth_response.response.client_data_json)?;

    let record = ChallengeStore::consume(&client_data.challenge)
        .await?
        .ok_or_else(|| PasskeyError::Challenge("Unknown or expired challenge".to_string()))?;
    if record.ceremony != CeremonyType::Authentication {
        return Err(PasskeyError::Challenge(
            "Challenge was not minted for authentication".to_string(),
        ));
    }
    let username = record.username;

    client_data.verify("webauthn.get", &settings.origin)?;

    let auth_data = AuthenticatorData::from_base64(&auth_response.response.authenticator_data)?;
    auth_data.verify(&settings.rp_id, &settings.user_verification)?;

    if auth_response.id != auth_response.raw_id {
        return Err(PasskeyError::Format("Credential id mismatch".to_string()));
    }
    tracing::trace!(user_handle = ?auth_response.response.user_handle, "Assertion received");

    let stored = CredentialRegistry::credentials(&username)
        .await?
        .into_iter()
        .find(|c| c.credential_id == auth_response.id)
        .ok_or_else(|| {
            PasskeyError::Authentication("Credential is not registered for user".to_string())
        })?;

    verify_signature(auth_response, &client_data, &auth_data, &stored.public_key)?;

    // Authenticators without a counter always report 0, so equal is accepted
    if auth_data.counter < stored.counter {
        tracing::warn!(
            username = %username,
            credential_id = %stored.credential_id,
            stored = stored.counter,
            received = auth_data.counter,
            "Signature counter went backwards, possible cloned authenticator"
        );
        return Err(PasskeyError::Authentication(
            "Signature counter is stale".to_string(),
        ));
    }

    if !CredentialRegistry::update_counter(&username, &stored.credential_id, auth_data.counter)
        .await?
    {
        return Err(PasskeyError::Authentication(
            "Credential was removed during authentication".to_string(),
        ));
    }

    tracing::info!(username = %username, "Passkey authentication succeeded");
    Ok(username)
}

fn verify_signature(
    auth_response: &AuthenticatorResponse,
    client_data: &ParsedClientData,
    auth_data: &AuthenticatorData,
    public_key_b64: &str,
) -> Result<(), PasskeyError> {
    let signature = base64url_decode(&auth_response.response.signature)
        .map_err(|e| PasskeyError::Format(format!("Invalid signature encoding: {e}")))?;
    let public_key = base64url_decode(public_key_b64)
        .map_err(|e| PasskeyError::Format(format!("Invalid stored public key: {e}")))?;

    let mut signed_data = Vec::with_capacity(auth_data.raw_data.len() + 32);
    signed_data.extend_from_slice(&auth_data.raw_data);
    signed_data.extend_from_slice(client_data.hash().as_ref());

    UnparsedPublicKey::new(&ring::signature::ECDSA_P256_SHA256_ASN1, &public_key)
        .verify(&signed_data, &signature)
        .map_err(|_| PasskeyError::Verification("Signature verification failed".to_string()))
}
