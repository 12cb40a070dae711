use ciborium::value::Value as CborValue;
use ring::digest;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::passkey::errors::PasskeyError;
use crate::utils::base64url_decode;

/// Options for `navigator.credentials.create()`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub(super) challenge: String,
    pub(super) rp: RelyingParty,
    pub(super) user: PublicKeyCredentialUserEntity,
    pub(super) pub_key_cred_params: Vec<PubKeyCredParam>,
    pub(super) timeout: u32,
    pub(super) attestation: String,
    pub(super) authenticator_selection: AuthenticatorSelection,
    pub(super) exclude_credentials: Vec<CredentialDescriptor>,
}

impl RegistrationOptions {
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

/// Options for `navigator.credentials.get()`.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    pub(super) challenge: String,
    pub(super) timeout: u32,
    pub(super) rp_id: String,
    pub(super) allow_credentials: Vec<CredentialDescriptor>,
    pub(super) user_verification: String,
}

impl AuthenticationOptions {
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

#[derive(Serialize, Debug)]
pub(super) struct RelyingParty {
    pub(super) id: String,
    pub(super) name: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct PublicKeyCredentialUserEntity {
    /// base64url of the username
    pub(super) id: String,
    pub(super) name: String,
    pub(super) display_name: String,
}

#[derive(Serialize, Debug)]
pub(super) struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub(super) type_: String,
    pub(super) alg: i32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthenticatorSelection {
    pub(super) resident_key: String,
    pub(super) user_verification: String,
}

#[derive(Serialize, Debug)]
pub(super) struct CredentialDescriptor {
    #[serde(rename = "type")]
    pub(super) type_: String,
    pub(super) id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) transports: Vec<String>,
}

/// Credential returned by the browser at the end of registration.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredential {
    pub(super) id: String,
    #[serde(alias = "raw_id")]
    pub(super) raw_id: String,
    pub(super) response: AuthenticatorAttestationResponse,
    #[serde(rename = "type")]
    pub(super) type_: String,
    /// Display name chosen by the user
    #[serde(default)]
    pub(super) name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(super) struct AuthenticatorAttestationResponse {
    #[serde(rename = "clientDataJSON", alias = "client_data_json")]
    pub(super) client_data_json: String,
    #[serde(rename = "attestationObject", alias = "attestation_object")]
    pub(super) attestation_object: String,
    #[serde(default)]
    pub(super) transports: Vec<String>,
}

/// Assertion returned by the browser at the end of authentication.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorResponse {
    pub(super) id: String,
    #[serde(alias = "raw_id")]
    pub(super) raw_id: String,
    pub(super) response: AuthenticatorAssertionResponse,
}

#[derive(Deserialize, Debug)]
pub(super) struct AuthenticatorAssertionResponse {
    #[serde(rename = "clientDataJSON", alias = "client_data_json")]
    pub(super) client_data_json: String,
    #[serde(rename = "authenticatorData", alias = "authenticator_data")]
    pub(super) authenticator_data: String,
    pub(super) signature: String,
    #[serde(default, rename = "userHandle", alias = "user_handle")]
    pub(super) user_handle: Option<String>,
}

#[derive(Debug)]
pub(super) struct AttestationObject {
    pub(super) fmt: String,
    pub(super) auth_data: Vec<u8>,
    pub(super) att_stmt: Vec<(CborValue, CborValue)>,
}

impl AttestationObject {
    pub(super) fn from_base64(attestation_base64: &str) -> Result<Self, PasskeyError> {
        let attestation_bytes = base64url_decode(attestation_base64).map_err(|e| {
            PasskeyError::Format(format!("Failed to decode attestation object: {e}"))
        })?;

        let attestation_cbor: CborValue = ciborium::de::from_reader(&attestation_bytes[..])
            .map_err(|e| PasskeyError::Format(format!("Invalid CBOR data: {e}")))?;

        let CborValue::Map(map) = attestation_cbor else {
            return Err(PasskeyError::Format(
                "Invalid attestation format".to_string(),
            ));
        };

        let mut fmt = None;
        let mut auth_data = None;
        let mut att_stmt = None;

        for (key, value) in map {
            if let CborValue::Text(k) = key {
                match (k.as_str(), value) {
                    ("fmt", CborValue::Text(f)) => fmt = Some(f),
                    ("authData", CborValue::Bytes(data)) => auth_data = Some(data),
                    ("attStmt", CborValue::Map(stmt)) => att_stmt = Some(stmt),
                    _ => {}
                }
            }
        }

        match (fmt, auth_data, att_stmt) {
            (Some(fmt), Some(auth_data), Some(att_stmt)) => Ok(Self {
                fmt,
                auth_data,
                att_stmt,
            }),
            _ => Err(PasskeyError::Format(
                "Missing required attestation data".to_string(),
            )),
        }
    }
}

/// clientDataJSON, decoded but not yet checked.
#[derive(Debug)]
pub(super) struct ParsedClientData {
    pub(super) challenge: String,
    pub(super) origin: String,
    pub(super) type_: String,
    pub(super) raw_data: Vec<u8>,
}

#[derive(Deserialize)]
struct WebAuthnClientData {
    #[serde(rename = "type")]
    type_: String,
    challenge: String,
    origin: String,
}

impl ParsedClientData {
    pub(super) fn from_base64(client_data_json: &str) -> Result<Self, PasskeyError> {
        let raw_data = base64url_decode(client_data_json)
            .map_err(|e| PasskeyError::Format(format!("Failed to decode: {e}")))?;

        let data: WebAuthnClientData = serde_json::from_slice(&raw_data)
            .map_err(|e| PasskeyError::ClientData(format!("Invalid JSON: {e}")))?;

        Ok(Self {
            challenge: data.challenge,
            origin: data.origin,
            type_: data.type_,
            raw_data,
        })
    }

    /// Check the ceremony type and origin. The challenge is checked by
    /// consuming it.
    pub(super) fn verify(&self, expected_type: &str, expected_origin: &str) -> Result<(), PasskeyError> {
        if self.type_ != expected_type {
            return Err(PasskeyError::ClientData(format!(
                "Invalid type. Expected '{}', Got: {}",
                expected_type, self.type_
            )));
        }

        if self.origin != expected_origin {
            return Err(PasskeyError::ClientData(format!(
                "Invalid origin. Expected: {}, Got: {}",
                expected_origin, self.origin
            )));
        }

        Ok(())
    }

    pub(super) fn hash(&self) -> digest::Digest {
        digest::digest(&digest::SHA256, &self.raw_data)
    }
}

/// Flags for AuthenticatorData as defined in WebAuthn spec Level 2
pub(super) mod auth_data_flags {
    /// User Present (UP) - Bit 0
    pub(crate) const UP: u8 = 1 << 0;
    /// User Verified (UV) - Bit 2
    pub(crate) const UV: u8 = 1 << 2;
    /// Attested Credential Data Present - Bit 6
    pub(crate) const AT: u8 = 1 << 6;
}

/// AuthenticatorData structure as defined in WebAuthn spec Level 2
/// https://www.w3.org/TR/webauthn-2/#sctn-authenticator-data
#[derive(Debug)]
pub(super) struct AuthenticatorData {
    pub(super) rp_id_hash: Vec<u8>,
    pub(super) flags: u8,
    pub(super) counter: u32,
    pub(super) raw_data: Vec<u8>,
}

/// The attested credential data block that follows the counter during registration.
#[derive(Debug)]
pub(super) struct AttestedCredential {
    pub(super) aaguid: [u8; 16],
    pub(super) credential_id: Vec<u8>,
    pub(super) public_key_cbor: CborValue,
}

impl AuthenticatorData {
    pub(super) fn from_base64(auth_data: &str) -> Result<Self, PasskeyError> {
        let data = base64url_decode(auth_data)
            .map_err(|e| PasskeyError::Format(format!("Failed to decode: {e}")))?;
        Self::from_bytes(data)
    }

    /// Format (minimum 37 bytes):
    /// - RP ID Hash (32 bytes)
    /// - Flags (1 byte)
    /// - Counter (4 bytes)
    /// - Optional: Attested Credential Data
    /// - Optional: Extensions
    pub(super) fn from_bytes(data: Vec<u8>) -> Result<Self, PasskeyError> {
        if data.len() < 37 {
            return Err(PasskeyError::AuthenticatorData(
                "Authenticator data too short".into(),
            ));
        }

        Ok(Self {
            rp_id_hash: data[..32].to_vec(),
            flags: data[32],
            counter: u32::from_be_bytes([data[33], data[34], data[35], data[36]]),
            raw_data: data,
        })
    }

    pub(super) fn is_user_present(&self) -> bool {
        (self.flags & auth_data_flags::UP) != 0
    }

    pub(super) fn is_user_verified(&self) -> bool {
        (self.flags & auth_data_flags::UV) != 0
    }

    pub(super) fn has_attested_credential_data(&self) -> bool {
        (self.flags & auth_data_flags::AT) != 0
    }

    /// Check rpIdHash, user presence and, when required, user verification.
    pub(super) fn verify(&self, rp_id: &str, user_verification: &str) -> Result<(), PasskeyError> {
        let expected_hash = digest::digest(&digest::SHA256, rp_id.as_bytes());
        if !bool::from(self.rp_id_hash.as_slice().ct_eq(expected_hash.as_ref())) {
            return Err(PasskeyError::AuthenticatorData(
                "Invalid RP ID hash".to_string(),
            ));
        }

        if !self.is_user_present() {
            return Err(PasskeyError::AuthenticatorData(
                "User Present flag not set".to_string(),
            ));
        }

        if user_verification == "required" && !self.is_user_verified() {
            return Err(PasskeyError::AuthenticatorData(format!(
                "User verification required but flag not set. Flags: {:02x}",
                self.flags
            )));
        }

        tracing::trace!(
            user_verified = self.is_user_verified(),
            attested = self.has_attested_credential_data(),
            counter = self.counter,
            "Authenticator data verification passed"
        );
        Ok(())
    }

    /// Parse the attested credential data. Requires the AT flag.
    pub(super) fn attested_credential(&self) -> Result<AttestedCredential, PasskeyError> {
        if !self.has_attested_credential_data() {
            return Err(PasskeyError::AuthenticatorData(
                "No attested credential data present".to_string(),
            ));
        }

        let data = &self.raw_data;
        let mut pos = 37;
        if data.len() < pos + 18 {
            return Err(PasskeyError::AuthenticatorData(
                "Authenticator data too short for attested credential".to_string(),
            ));
        }

        let mut aaguid = [0u8; 16];
        aaguid.copy_from_slice(&data[pos..pos + 16]);
        pos += 16;

        let cred_id_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;

        if cred_id_len == 0 || cred_id_len > 1023 {
            return Err(PasskeyError::AuthenticatorData(
                "Invalid credential ID length".to_string(),
            ));
        }
        if data.len() < pos + cred_id_len {
            return Err(PasskeyError::AuthenticatorData(
                "Authenticator data too short for credential ID".to_string(),
            ));
        }

        let credential_id = data[pos..pos + cred_id_len].to_vec();
        pos += cred_id_len;

        let public_key_cbor: CborValue = ciborium::de::from_reader(&data[pos..])
            .map_err(|e| PasskeyError::Format(format!("Invalid public key CBOR: {e}")))?;

        Ok(AttestedCredential {
            aaguid,
            credential_id,
            public_key_cbor,
        })
    }
}
