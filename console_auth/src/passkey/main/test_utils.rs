//! Software authenticator for driving real ceremonies in tests.

use ciborium::value::Value as CborValue;
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};

use crate::utils::base64url_encode;

use super::types::{AuthenticatorResponse, RegisterCredential, auth_data_flags};

/// A P-256 platform authenticator holding a single credential.
pub(crate) struct SoftAuthenticator {
    key_pair: EcdsaKeyPair,
    credential_id: Vec<u8>,
    counter: u32,
    counting: bool,
    rng: SystemRandom,
}

impl SoftAuthenticator {
    pub(crate) fn new() -> Self {
        let rng = SystemRandom::new();
        let mut credential_id = vec![0u8; 16];
        rng.fill(&mut credential_id).unwrap();
        Self::with_credential_id(&credential_id)
    }

    /// A fresh key pair that claims an existing credential id.
    pub(crate) fn with_credential_id(credential_id: &[u8]) -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        Self {
            key_pair,
            credential_id: credential_id.to_vec(),
            counter: 0,
            counting: true,
            rng,
        }
    }

    pub(crate) fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    pub(crate) fn credential_id_b64(&self) -> String {
        base64url_encode(&self.credential_id)
    }

    /// Uncompressed SEC1 public key
    pub(crate) fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }

    pub(crate) fn counter(&self) -> u32 {
        self.counter
    }

    pub(crate) fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }

    /// Behave like an authenticator without a signature counter.
    pub(crate) fn disable_counter(&mut self) {
        self.counting = false;
        self.counter = 0;
    }

    pub(crate) fn register(&self, challenge: &str, origin: &str, rp_id: &str) -> RegisterCredential {
        self.registration("none", challenge, origin, rp_id)
    }

    pub(crate) fn register_packed(
        &self,
        challenge: &str,
        origin: &str,
        rp_id: &str,
    ) -> RegisterCredential {
        self.registration("packed", challenge, origin, rp_id)
    }

    pub(crate) fn assert(
        &mut self,
        challenge: &str,
        origin: &str,
        rp_id: &str,
    ) -> AuthenticatorResponse {
        if self.counting {
            self.counter += 1;
        }
        let client_data = client_data_json("webauthn.get", challenge, origin);
        let auth_data = self.auth_data(rp_id, auth_data_flags::UP, false);
        let signature = self.sign(&auth_data, &client_data);

        let id = self.credential_id_b64();
        serde_json::from_value(serde_json::json!({
            "id": id,
            "rawId": id,
            "type": "public-key",
            "response": {
                "clientDataJSON": base64url_encode(&client_data),
                "authenticatorData": base64url_encode(&auth_data),
                "signature": base64url_encode(&signature),
                "userHandle": null
            }
        }))
        .unwrap()
    }

    fn registration(
        &self,
        fmt: &str,
        challenge: &str,
        origin: &str,
        rp_id: &str,
    ) -> RegisterCredential {
        let client_data = client_data_json("webauthn.create", challenge, origin);
        let auth_data = self.auth_data(rp_id, auth_data_flags::UP | auth_data_flags::AT, true);

        let att_stmt = match fmt {
            "packed" => vec![
                (
                    CborValue::Text("alg".to_string()),
                    CborValue::Integer((-7).into()),
                ),
                (
                    CborValue::Text("sig".to_string()),
                    CborValue::Bytes(self.sign(&auth_data, &client_data)),
                ),
            ],
            _ => vec![],
        };

        let attestation_object = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text(fmt.to_string()),
            ),
            (
                CborValue::Text("attStmt".to_string()),
                CborValue::Map(att_stmt),
            ),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data),
            ),
        ]);
        let mut attestation_bytes = Vec::new();
        ciborium::ser::into_writer(&attestation_object, &mut attestation_bytes).unwrap();

        let id = self.credential_id_b64();
        serde_json::from_value(serde_json::json!({
            "id": id,
            "rawId": id,
            "type": "public-key",
            "response": {
                "clientDataJSON": base64url_encode(&client_data),
                "attestationObject": base64url_encode(&attestation_bytes),
                "transports": ["internal"]
            }
        }))
        .unwrap()
    }

    fn auth_data(&self, rp_id: &str, flags: u8, attested: bool) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, rp_id.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&self.counter.to_be_bytes());

        if attested {
            data.extend_from_slice(&[0u8; 16]); // AAGUID
            data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
            data.extend_from_slice(&self.credential_id);

            let point = self.public_key();
            let cose_key = CborValue::Map(vec![
                (CborValue::Integer(1.into()), CborValue::Integer(2.into())),
                (CborValue::Integer(3.into()), CborValue::Integer((-7).into())),
                (CborValue::Integer((-1).into()), CborValue::Integer(1.into())),
                (
                    CborValue::Integer((-2).into()),
                    CborValue::Bytes(point[1..33].to_vec()),
                ),
                (
                    CborValue::Integer((-3).into()),
                    CborValue::Bytes(point[33..65].to_vec()),
                ),
            ]);
            ciborium::ser::into_writer(&cose_key, &mut data).unwrap();
        }
        data
    }

    fn sign(&self, auth_data: &[u8], client_data: &[u8]) -> Vec<u8> {
        let mut message = auth_data.to_vec();
        message.extend_from_slice(digest::digest(&digest::SHA256, client_data).as_ref());
        self.key_pair
            .sign(&self.rng, &message)
            .unwrap()
            .as_ref()
            .to_vec()
    }
}

fn client_data_json(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "type": type_,
        "challenge": challenge,
        "origin": origin,
        "crossOrigin": false
    }))
    .unwrap()
}
