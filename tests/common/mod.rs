#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use actix_web::web::Bytes;
use async_trait::async_trait;
use httpmock::prelude::*;
use httpmock::Mock;
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};

use peoplesuite::db::ProfileStore;
use peoplesuite::errors::StoreError;
use peoplesuite::models::employee::EmployeeProfile;
use peoplesuite::utils::s3::PhotoStore;

pub const TRUSTED_KID: &str = "peoplesuite-test-1";
pub const TRUSTED_KEY_PEM: &str = include_str!("../fixtures/trusted_key.pem");
/// Public modulus of `trusted_key.pem`.
pub const TRUSTED_KEY_N: &str = "8E4A8n-iF_eLz8WL8J7iLK1a5DwHBNjRYtuEXe0DjKMmQItf0RAqQeHaQmOG6upQ1VyBlroNcQeqh16rLJ-SKAWgwYKJfbEoL9ZJSdeKjPOfBOU1kjtqCSOIoqqCgzi7yyNLy7NgkanIeRT5WqizfcCH8dvqYvj5Msv9tvGqQJdON2PofSCHtE2axwnrzSqfXQdvuI2_5aeqalPn6GRFLP8HY8PHghLwkfRk3O3FM7xbrUNnxGqar3J7n98SvskA65zodMmKWMr9EKLPVoTGeZl-gUeZcmTAIdjBa72GvbM6BH8I6w5_S4FBhZRSAJ8BmZiA_Qgj14ZdtyB9WsyzNw";
/// A key that is not published in the JWKS.
pub const ROGUE_KEY_PEM: &str = include_str!("../fixtures/rogue_key.pem");

pub const JWKS_PATH: &str = "/.well-known/jwks.json";
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth2/token";
pub const CLIENT_ID: &str = "peoplesuite-client";
pub const CLIENT_SECRET: &str = "peoplesuite-secret";

/// A key set publishing the trusted public key under each of `kids`.
pub fn jwks_body(kids: &[&str]) -> Value {
    let keys: Vec<Value> = kids
        .iter()
        .map(|kid| {
            json!({
                "kty": "RSA",
                "kid": kid,
                "use": "sig",
                "alg": "RS256",
                "n": TRUSTED_KEY_N,
                "e": "AQAB",
            })
        })
        .collect();
    json!({ "keys": keys })
}

pub async fn mock_jwks(server: &MockServer) -> Mock<'_> {
    mock_jwks_with(server, &[TRUSTED_KID]).await
}

pub async fn mock_jwks_with<'a>(server: &'a MockServer, kids: &[&str]) -> Mock<'a> {
    let body = jwks_body(kids);
    server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Signs an access token shaped like a Cognito client-credentials token.
pub fn mint_token(key_pem: &str, kid: &str, ttl_secs: i64) -> String {
    let exp = get_current_timestamp() as i64 + ttl_secs;
    sign_claims(
        key_pem,
        kid,
        &json!({
            "sub": CLIENT_ID,
            "client_id": CLIENT_ID,
            "token_use": "access",
            "scope": "peoplesuite/employees",
            "exp": exp,
            "iat": get_current_timestamp(),
        }),
    )
}

pub fn sign_claims(key_pem: &str, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(
        &header,
        claims,
        &EncodingKey::from_rsa_pem(key_pem.as_bytes()).expect("test key should parse"),
    )
    .expect("test token should sign")
}

pub fn valid_token() -> String {
    mint_token(TRUSTED_KEY_PEM, TRUSTED_KID, 3600)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[derive(Default)]
pub struct InMemoryProfileStore {
    items: Mutex<HashMap<String, EmployeeProfile>>,
    pub gets: AtomicUsize,
    pub inserts: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.inserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, employee_id: &str) -> Result<Option<EmployeeProfile>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().get(employee_id).cloned())
    }

    async fn insert_if_absent(&self, profile: &EmployeeProfile) -> Result<bool, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock().unwrap();
        if items.contains_key(&profile.employee_id) {
            return Ok(false);
        }
        items.insert(profile.employee_id.clone(), profile.clone());
        Ok(true)
    }
}

/// Fails every call, as an unreachable table would.
pub struct FailingProfileStore;

#[async_trait]
impl ProfileStore for FailingProfileStore {
    async fn get(&self, _employee_id: &str) -> Result<Option<EmployeeProfile>, StoreError> {
        Err(StoreError::Backend("ResourceNotFoundException: table gone".into()))
    }

    async fn insert_if_absent(&self, _profile: &EmployeeProfile) -> Result<bool, StoreError> {
        Err(StoreError::Backend("ResourceNotFoundException: table gone".into()))
    }
}

/// Returns a stored item that lost one of its attributes.
pub struct CorruptProfileStore;

#[async_trait]
impl ProfileStore for CorruptProfileStore {
    async fn get(&self, _employee_id: &str) -> Result<Option<EmployeeProfile>, StoreError> {
        Err(StoreError::Malformed("Country"))
    }

    async fn insert_if_absent(&self, _profile: &EmployeeProfile) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryPhotoStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl InMemoryPhotoStore {
    pub fn object(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, StoreError> {
        Ok(format!(
            "https://photos.s3.amazonaws.com/{key}?X-Amz-Expires=3600&X-Amz-Signature=test"
        ))
    }
}

/// Fails every call, as a missing bucket or bad credentials would.
pub struct FailingPhotoStore;

#[async_trait]
impl PhotoStore for FailingPhotoStore {
    async fn put(&self, _key: &str, _body: Bytes, _content_type: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("NoSuchBucket: photos".into()))
    }

    async fn presigned_url(&self, _key: &str) -> Result<String, StoreError> {
        Err(StoreError::Backend("credentials provider failed".into()))
    }
}

/// Builds the full app against `$server` (token + JWKS endpoints) and the given stores.
macro_rules! test_app {
    ($server:expr, $profiles:expr, $photos:expr) => {
        test_app!(
            $server,
            $profiles,
            $photos,
            peoplesuite::handlers::photo::PhotoUploadConfig::default()
        )
    };
    ($server:expr, $profiles:expr, $photos:expr, $upload:expr) => {{
        let http = reqwest::Client::new();
        let issuer = peoplesuite::utils::oauth::TokenIssuer::new(
            http.clone(),
            $server.url(common::TOKEN_ENDPOINT_PATH),
            common::CLIENT_ID,
            common::CLIENT_SECRET,
        );
        let verifier =
            peoplesuite::utils::jwt::TokenVerifier::new(http, $server.url(common::JWKS_PATH));
        let profiles: std::sync::Arc<dyn peoplesuite::db::ProfileStore> = $profiles;
        let photos: std::sync::Arc<dyn peoplesuite::utils::s3::PhotoStore> = $photos;

        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::from_fn(peoplesuite::middleware::verify_token))
                .app_data(actix_web::web::Data::new(issuer))
                .app_data(actix_web::web::Data::new(verifier))
                .app_data(actix_web::web::Data::from(profiles))
                .app_data(actix_web::web::Data::from(photos))
                .app_data(actix_web::web::Data::new($upload))
                .configure(peoplesuite::routes),
        )
        .await
    }};
}
