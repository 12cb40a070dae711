use ciborium::value::Value as CborValue;
use ring::signature::UnparsedPublicKey;
use webpki::EndEntityCert;
use x509_parser::extensions::ParsedExtension;
use x509_parser::{certificate::X509Certificate, prelude::*, time::ASN1Time};

use crate::passkey::errors::PasskeyError;

use super::utils::{ES256_ALG, get_sig_from_stmt};

// id-fido-gen-ce-aaguid
const OID_FIDO_GEN_CE_AAGUID: &str = "1.3.6.1.4.1.45724.1.1.4";

/// Verifies a packed attestation statement.
///
/// Supports self attestation (signed by the credential key itself) and basic
/// attestation with an x5c chain. ECDAA is rejected.
pub(super) fn verify_packed_attestation(
    auth_data: &[u8],
    client_data_hash: &[u8],
    att_stmt: &[(CborValue, CborValue)],
    credential_public_key: &[u8],
) -> Result<(), PasskeyError> {
    let (alg, sig) = get_sig_from_stmt(att_stmt)?;

    if alg != ES256_ALG {
        return Err(PasskeyError::Verification(format!(
            "Unsupported or unrecognized algorithm: {alg}"
        )));
    }

    let mut signed_data = Vec::with_capacity(auth_data.len() + client_data_hash.len());
    signed_data.extend_from_slice(auth_data);
    signed_data.extend_from_slice(client_data_hash);

    let mut x5c_opt: Option<Vec<Vec<u8>>> = None;
    let mut has_ecdaa_key_id = false;

    for (k, v) in att_stmt {
        match (k, v) {
            (CborValue::Text(key), CborValue::Array(certs)) if key == "x5c" => {
                let cert_chain: Vec<Vec<u8>> = certs
                    .iter()
                    .filter_map(|c| match c {
                        CborValue::Bytes(bytes) => Some(bytes.clone()),
                        _ => None,
                    })
                    .collect();
                if !cert_chain.is_empty() {
                    x5c_opt = Some(cert_chain);
                }
            }
            (CborValue::Text(key), _) if key == "ecdaaKeyId" => has_ecdaa_key_id = true,
            _ => {}
        }
    }

    match (x5c_opt, has_ecdaa_key_id) {
        (Some(x5c), false) => {
            tracing::debug!("Packed attestation with certificate chain");
            verify_with_certificate(auth_data, &signed_data, &sig, &x5c)
        }
        (None, false) => {
            tracing::debug!("Packed self attestation");
            UnparsedPublicKey::new(&ring::signature::ECDSA_P256_SHA256_ASN1, credential_public_key)
                .verify(&signed_data, &sig)
                .map_err(|_| {
                    PasskeyError::Verification(
                        "Self attestation signature verification failed".to_string(),
                    )
                })
        }
        (_, true) => Err(PasskeyError::Verification(
            "ECDAA attestation not supported".to_string(),
        )),
    }
}

fn verify_with_certificate(
    auth_data: &[u8],
    signed_data: &[u8],
    sig: &[u8],
    x5c: &[Vec<u8>],
) -> Result<(), PasskeyError> {
    let attestn_cert_bytes = &x5c[0];
    let attestn_cert = EndEntityCert::try_from(attestn_cert_bytes.as_slice()).map_err(|e| {
        PasskeyError::Verification(format!("Failed to parse attestation certificate: {e:?}"))
    })?;

    let (_, x509_cert) = X509Certificate::from_der(attestn_cert_bytes).map_err(|e| {
        PasskeyError::Verification(format!("Failed to parse X509 certificate: {e}"))
    })?;

    verify_attestation_cert(&x509_cert, auth_data)?;

    attestn_cert
        .verify_signature(&webpki::ECDSA_P256_SHA256, signed_data, sig)
        .map_err(|_| PasskeyError::Verification("Attestation signature invalid".to_string()))?;

    verify_chain_validity(x5c)
}

fn verify_attestation_cert(cert: &X509Certificate, auth_data: &[u8]) -> Result<(), PasskeyError> {
    let basic_constraints = cert
        .get_extension_unique(&oid_registry::OID_X509_EXT_BASIC_CONSTRAINTS)
        .map_err(|e| PasskeyError::Verification(format!("Invalid extensions: {e}")))?;
    if let Some(ext) = basic_constraints {
        if let ParsedExtension::BasicConstraints(bc) = ext.parsed_extension() {
            if bc.ca {
                return Err(PasskeyError::Verification(
                    "Certificate must not be a CA certificate".to_string(),
                ));
            }
        }
    }

    if let Some(fido_ext) = cert
        .extensions()
        .iter()
        .find(|ext| ext.oid.to_id_string() == OID_FIDO_GEN_CE_AAGUID)
    {
        // OCTET STRING (0x04, 0x10) wrapping the 16 byte AAGUID
        let cert_aaguid = fido_ext.value;
        if cert_aaguid.len() != 18 || auth_data.len() < 53 {
            return Err(PasskeyError::Verification(
                "Malformed AAGUID extension".to_string(),
            ));
        }

        if auth_data[37..53] != cert_aaguid[2..18] {
            return Err(PasskeyError::Verification(
                "AAGUID mismatch between certificate and authenticator data".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks each certificate's validity period. Whether the chain leads to a
/// trusted root is not established here; there is no trust anchor store.
fn verify_chain_validity(x5c: &[Vec<u8>]) -> Result<(), PasskeyError> {
    let now = ASN1Time::from_timestamp(chrono::Utc::now().timestamp())
        .map_err(|e| PasskeyError::Verification(format!("Failed to convert time: {e}")))?;

    for cert_bytes in x5c {
        let (_, cert) = X509Certificate::from_der(cert_bytes).map_err(|e| {
            PasskeyError::Verification(format!("Failed to parse certificate in chain: {e}"))
        })?;

        if !cert.validity().is_valid_at(now) {
            return Err(PasskeyError::Verification(
                "Certificate in chain is expired or not yet valid".to_string(),
            ));
        }
    }

    Ok(())
}
