use chrono::Utc;
use uuid::Uuid;

use crate::config::settings;
use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::CredentialRegistry;
use crate::passkey::types::{CeremonyType, CredentialView, StoredCredential};
use crate::utils::{base64url_decode, base64url_encode};

use super::attestation::{extract_public_key_coords, uncompressed_point, verify_attestation};
use super::challenge::ChallengeStore;
use super::types::{
    AttestationObject, AuthenticatorData, AuthenticatorSelection, CredentialDescriptor,
    ParsedClientData, PubKeyCredParam, PublicKeyCredentialUserEntity, RegisterCredential,
    RegistrationOptions, RelyingParty,
};

const DEFAULT_CREDENTIAL_NAME: &str = "Passkey";
const MAX_CREDENTIAL_NAME_CHARS: usize = 64;

/// Build creation options for an already authenticated user.
pub(crate) async fn start_registration(
    username: &str,
) -> Result<RegistrationOptions, PasskeyError> {
    let settings = settings()?;
    let existing = CredentialRegistry::credentials(username).await?;

    let challenge = ChallengeStore::mint(username, CeremonyType::Registration).await?;

    let options = RegistrationOptions {
        challenge,
        rp: RelyingParty {
            id: settings.rp_id.clone(),
            name: settings.rp_name.clone(),
        },
        user: PublicKeyCredentialUserEntity {
            id: base64url_encode(username.as_bytes()),
            name: username.to_string(),
            display_name: username.to_string(),
        },
        pub_key_cred_params: vec![PubKeyCredParam {
            type_: "public-key".to_string(),
            alg: -7,
        }],
        timeout: settings.timeout,
        attestation: settings.attestation.clone(),
        authenticator_selection: AuthenticatorSelection {
            resident_key: "preferred".to_string(),
            user_verification: settings.user_verification.clone(),
        },
        exclude_credentials: existing
            .into_iter()
            .map(|c| CredentialDescriptor {
                type_: "public-key".to_string(),
                id: c.credential_id,
                transports: c.transports,
            })
            .collect(),
    };

    tracing::debug!(
        username,
        excluded = options.exclude_credentials.len(),
        "Registration options created"
    );
    Ok(options)
}

/// Verify a creation response and append the new credential to `username`'s list.
///
/// The challenge is consumed before anything else is checked, so a failed
/// attempt cannot be retried with the same challenge.
pub(crate) async fn finish_registration(
    username: &str,
    reg_data: &RegisterCredential,
) -> Result<CredentialView, PasskeyError> {
    let settings = settings()?;

    let client_data = ParsedClientData::from_base64(&reg_data.response.client_data_json)?;

    if !ChallengeStore::consume_and_validate(
        &client_data.challenge,
        username,
        CeremonyType::Registration,
    )
    .await?
    {
        return Err(PasskeyError::Challenge(
            "Unknown, expired or mismatched registration challenge".to_string(),
        ));
    }

    client_data.verify("webauthn.create", &settings.origin)?;

    if reg_data.type_ != "public-key" || reg_data.id != reg_data.raw_id {
        return Err(PasskeyError::Format(
            "Unexpected credential type or id".to_string(),
        ));
    }

    let attestation = AttestationObject::from_base64(&reg_data.response.attestation_object)?;
    let auth_data = AuthenticatorData::from_bytes(attestation.auth_data.clone())?;
    auth_data.verify(&settings.rp_id, &settings.user_verification)?;

    let attested = auth_data.attested_credential()?;
    let raw_id = base64url_decode(&reg_data.raw_id)?;
    if attested.credential_id != raw_id {
        return Err(PasskeyError::AuthenticatorData(
            "Credential ID in authenticator data does not match the response".to_string(),
        ));
    }

    let (x, y) = extract_public_key_coords(&attested.public_key_cbor)?;
    let public_key = uncompressed_point(&x, &y);

    verify_attestation(&attestation, client_data.hash().as_ref(), &public_key)?;

    let credential_id = base64url_encode(&attested.credential_id);
    let existing = CredentialRegistry::credentials(username).await?;
    if existing.iter().any(|c| c.credential_id == credential_id) {
        return Err(PasskeyError::Registration(
            "Credential is already registered".to_string(),
        ));
    }

    let credential = StoredCredential {
        credential_id,
        public_key: base64url_encode(&public_key),
        counter: auth_data.counter,
        transports: reg_data.response.transports.clone(),
        aaguid: Uuid::from_bytes(attested.aaguid).hyphenated().to_string(),
        name: credential_name(reg_data.name.as_deref()),
        created_at: Utc::now(),
        last_used_at: None,
    };
    let view = CredentialView::from(&credential);

    CredentialRegistry::add(username, credential).await?;

    tracing::info!(username, credential_id = %view.id, fmt = %attestation.fmt, "Passkey registered");
    Ok(view)
}

fn credential_name(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.chars().take(MAX_CREDENTIAL_NAME_CHARS).collect(),
        _ => DEFAULT_CREDENTIAL_NAME.to_string(),
    }
}
