//! Bearer token verification against a published JWKS.
//!
//! Tokens must be RS256 and carry a `kid` header naming a key in the set. The
//! set is cached for `cache_ttl`; a `kid` missing from a fresh cache forces
//! one refetch so rotated keys are accepted without a restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::Config;

/// Decoded token claims. Only the signature and a present `exp` are enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: Option<u64>,
    pub client_id: Option<String>,
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("JWKS endpoint answered with status {0}")]
    KeySetStatus(u16),
    #[error("JWKS endpoint unavailable: {0}")]
    KeySetUnavailable(String),
}

struct CachedKeys {
    fetched_at: Instant,
    keys: HashMap<String, DecodingKey>,
}

pub struct TokenVerifier {
    http: reqwest::Client,
    jwks_url: String,
    validation: Validation,
    cache_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl TokenVerifier {
    pub fn new(http: reqwest::Client, jwks_url: impl Into<String>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            http,
            jwks_url: jwks_url.into(),
            validation,
            cache_ttl: Duration::from_secs(300),
            cache: RwLock::new(None),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &Config) -> Self {
        let mut verifier = Self::new(http, config.jwks_url.clone()).with_cache_ttl(config.jwks_cache_ttl);
        if let Some(issuer) = &config.jwt_issuer {
            verifier = verifier.with_issuer(issuer);
        }
        if let Some(audience) = &config.jwt_audience {
            verifier = verifier.with_audience(audience);
        }
        verifier
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let header = decode_header(token).map_err(|err| JwtError::Invalid(err.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(JwtError::Invalid(format!("unexpected algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| JwtError::Invalid("token header has no kid".to_string()))?;

        let key = self.signing_key(&kid).await?;

        decode::<Claims>(token, &key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(err.to_string()),
            })
    }

    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, JwtError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                    debug!("kid {kid} not in cached JWKS, refetching");
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();
        *self.cache.write().await = Some(CachedKeys {
            fetched_at: Instant::now(),
            keys,
        });

        key.ok_or_else(|| JwtError::Invalid(format!("no signing key with kid {kid}")))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, JwtError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|err| JwtError::KeySetUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JwtError::KeySetStatus(status.as_u16()));
        }

        let set: JwkSet = response
            .json()
            .await
            .map_err(|err| JwtError::KeySetUnavailable(err.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(err) => warn!("Skipping unusable JWKS key {kid}: {err}"),
            }
        }
        Ok(keys)
    }
}

/// Splits an `Authorization` header value into its bearer token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Some(*token),
        _ => None,
    }
}
