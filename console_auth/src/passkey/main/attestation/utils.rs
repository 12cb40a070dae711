use ciborium::value::{Integer, Value as CborValue};

use crate::passkey::errors::PasskeyError;

/// COSE algorithm identifier for ECDSA w/ SHA-256
pub(crate) const ES256_ALG: i128 = -7;

const COSE_KTY: i128 = 1;
const COSE_ALG: i128 = 3;
const COSE_CRV: i128 = -1;
const COSE_X: i128 = -2;
const COSE_Y: i128 = -3;
const KTY_EC2: i128 = 2;
const CRV_P256: i128 = 1;

pub(crate) fn integer_to_i128(i: &Integer) -> i128 {
    i128::from(*i)
}

pub(super) fn get_sig_from_stmt(
    att_stmt: &[(CborValue, CborValue)],
) -> Result<(i128, Vec<u8>), PasskeyError> {
    let mut alg: Option<i128> = None;
    let mut sig: Option<Vec<u8>> = None;

    for (key, value) in att_stmt {
        match (key, value) {
            (CborValue::Text(k), CborValue::Integer(a)) if k == "alg" => {
                alg = Some(integer_to_i128(a));
            }
            (CborValue::Text(k), CborValue::Bytes(s)) if k == "sig" => {
                sig = Some(s.clone());
            }
            _ => {}
        }
    }

    match (alg, sig) {
        (Some(a), Some(s)) => Ok((a, s)),
        _ => Err(PasskeyError::Verification(
            "Missing algorithm or signature in attestation statement".to_string(),
        )),
    }
}

/// Extract the P-256 coordinates from a COSE_Key, insisting on EC2 / ES256 / P-256.
pub(crate) fn extract_public_key_coords(
    public_key_cbor: &CborValue,
) -> Result<(Vec<u8>, Vec<u8>), PasskeyError> {
    let CborValue::Map(map) = public_key_cbor else {
        return Err(PasskeyError::Format(
            "Invalid public key format".to_string(),
        ));
    };

    let mut kty = None;
    let mut alg = None;
    let mut crv = None;
    let mut x_coord = None;
    let mut y_coord = None;

    for (key, value) in map {
        let CborValue::Integer(k) = key else {
            continue;
        };
        match (integer_to_i128(k), value) {
            (COSE_KTY, CborValue::Integer(v)) => kty = Some(integer_to_i128(v)),
            (COSE_ALG, CborValue::Integer(v)) => alg = Some(integer_to_i128(v)),
            (COSE_CRV, CborValue::Integer(v)) => crv = Some(integer_to_i128(v)),
            (COSE_X, CborValue::Bytes(x)) => x_coord = Some(x.clone()),
            (COSE_Y, CborValue::Bytes(y)) => y_coord = Some(y.clone()),
            _ => {}
        }
    }

    if kty != Some(KTY_EC2) || alg != Some(ES256_ALG) || crv != Some(CRV_P256) {
        return Err(PasskeyError::Format(format!(
            "Unsupported public key: kty={kty:?}, alg={alg:?}, crv={crv:?}"
        )));
    }

    match (x_coord, y_coord) {
        (Some(x), Some(y)) if x.len() == 32 && y.len() == 32 => Ok((x, y)),
        _ => Err(PasskeyError::Format(
            "Missing or invalid key coordinates".to_string(),
        )),
    }
}

/// Uncompressed SEC1 point `0x04 || x || y`.
pub(crate) fn uncompressed_point(x: &[u8], y: &[u8]) -> Vec<u8> {
    let mut public_key = Vec::with_capacity(1 + x.len() + y.len());
    public_key.push(0x04);
    public_key.extend_from_slice(x);
    public_key.extend_from_slice(y);
    public_key
}
