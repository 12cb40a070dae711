//! Shared setup for the router tests: environment, router and a software
//! passkey authenticator that produces browser-shaped JSON.

use std::sync::Once;

use axum::Router;
use axum::body::Body;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ciborium::value::Value as CborValue;
use http::{Request, Response, header};
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_ORIGIN: &str = "http://127.0.0.1:3000";
pub const TEST_RP_ID: &str = "127.0.0.1";
pub const TEST_SUPERUSER: &str = "root";

const TEST_ENV: &[(&str, &str)] = &[
    ("ORIGIN", TEST_ORIGIN),
    ("PASSKEY_RP_NAME", "Console Router Test"),
    ("JWT_SECRET", "router-test-signing-secret"),
    ("REFRESH_TOKEN_TTL_DAYS", "7"),
    ("CONSOLE_SUPERUSER", TEST_SUPERUSER),
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
];

/// Configure the environment once, initialize the library and build the router.
pub async fn test_router() -> Router {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        for (name, value) in TEST_ENV {
            unsafe {
                std::env::set_var(name, value);
            }
        }
    });

    console_auth_axum::init()
        .await
        .expect("console_auth initialization failed");
    console_auth_axum::console_auth_router_no_trace()
}

/// A username no other test will pick.
pub fn unique_username(prefix: &str) -> String {
    let mut suffix = [0u8; 8];
    SystemRandom::new().fill(&mut suffix).unwrap();
    format!("{prefix}-{}", hex(&suffix))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Send one request through the router and decode the JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (http::StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    decode(response).await
}

async fn decode(response: Response<Body>) -> (http::StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn b64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

const FLAG_UP: u8 = 0x01;
const FLAG_AT: u8 = 0x40;

/// Platform authenticator with one P-256 credential and a signature counter.
pub struct SoftAuthenticator {
    key_pair: EcdsaKeyPair,
    credential_id: Vec<u8>,
    counter: u32,
    rng: SystemRandom,
}

impl SoftAuthenticator {
    pub fn new() -> Self {
        let rng = SystemRandom::new();
        let mut credential_id = vec![0u8; 16];
        rng.fill(&mut credential_id).unwrap();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();
        Self {
            key_pair,
            credential_id,
            counter: 0,
            rng,
        }
    }

    pub fn credential_id(&self) -> String {
        b64(&self.credential_id)
    }

    pub fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }

    /// `navigator.credentials.create()` output for `challenge`
    pub fn register(&self, challenge: &str) -> Value {
        let client_data = client_data_json("webauthn.create", challenge);
        let auth_data = self.auth_data(FLAG_UP | FLAG_AT, true);

        let attestation_object = CborValue::Map(vec![
            (
                CborValue::Text("fmt".to_string()),
                CborValue::Text("none".to_string()),
            ),
            (
                CborValue::Text("attStmt".to_string()),
                CborValue::Map(vec![]),
            ),
            (
                CborValue::Text("authData".to_string()),
                CborValue::Bytes(auth_data),
            ),
        ]);
        let mut attestation_bytes = Vec::new();
        ciborium::ser::into_writer(&attestation_object, &mut attestation_bytes).unwrap();

        json!({
            "id": self.credential_id(),
            "rawId": self.credential_id(),
            "type": "public-key",
            "name": "Test key",
            "response": {
                "clientDataJSON": b64(&client_data),
                "attestationObject": b64(&attestation_bytes),
                "transports": ["internal"]
            }
        })
    }

    /// `navigator.credentials.get()` output for `challenge`
    pub fn assert(&mut self, challenge: &str) -> Value {
        self.counter += 1;
        let client_data = client_data_json("webauthn.get", challenge);
        let auth_data = self.auth_data(FLAG_UP, false);

        let mut message = auth_data.clone();
        message.extend_from_slice(digest::digest(&digest::SHA256, &client_data).as_ref());
        let signature = self.key_pair.sign(&self.rng, &message).unwrap();

        json!({
            "id": self.credential_id(),
            "rawId": self.credential_id(),
            "type": "public-key",
            "response": {
                "clientDataJSON": b64(&client_data),
                "authenticatorData": b64(&auth_data),
                "signature": b64(signature.as_ref()),
                "userHandle": null
            }
        })
    }

    fn auth_data(&self, flags: u8, attested: bool) -> Vec<u8> {
        let mut data = digest::digest(&digest::SHA256, TEST_RP_ID.as_bytes())
            .as_ref()
            .to_vec();
        data.push(flags);
        data.extend_from_slice(&self.counter.to_be_bytes());

        if attested {
            data.extend_from_slice(&[0u8; 16]);
            data.extend_from_slice(&(self.credential_id.len() as u16).to_be_bytes());
            data.extend_from_slice(&self.credential_id);

            let point = self.key_pair.public_key().as_ref();
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
}

fn client_data_json(type_: &str, challenge: &str) -> Vec<u8> {
    json!({
        "type": type_,
        "challenge": challenge,
        "origin": TEST_ORIGIN,
        "crossOrigin": false
    })
    .to_string()
    .into_bytes()
}
