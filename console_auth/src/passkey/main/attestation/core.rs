use crate::passkey::errors::PasskeyError;

use super::super::types::AttestationObject;
use super::none::verify_none_attestation;
use super::packed::verify_packed_attestation;

/// Verify the attestation statement for the formats the console accepts.
pub(crate) fn verify_attestation(
    attestation: &AttestationObject,
    client_data_hash: &[u8],
    credential_public_key: &[u8],
) -> Result<(), PasskeyError> {
    match attestation.fmt.as_str() {
        "none" => {
            tracing::debug!("Using 'none' attestation format");
            verify_none_attestation(&attestation.att_stmt)
        }
        "packed" => {
            tracing::debug!("Using 'packed' attestation format");
            verify_packed_attestation(
                &attestation.auth_data,
                client_data_hash,
                &attestation.att_stmt,
                credential_public_key,
            )
        }
        other => Err(PasskeyError::Format(format!(
            "Unsupported attestation format: {other}"
        ))),
    }
}
