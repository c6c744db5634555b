use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::types::OAuthProfile;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const PROVIDER: &str = "google";

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("failed to fetch signing keys: {0}")]
    Fetch(String),
    #[error("token header is invalid: {0}")]
    Header(String),
    #[error("token has no key id")]
    MissingKid,
    #[error("no signing key for kid {0}")]
    KeyNotFound(String),
    #[error("unsupported key type {0}")]
    UnsupportedKeyType(String),
    #[error("token rejected: {0}")]
    Invalid(String),
    #[error("token is missing the {0} claim")]
    MissingClaim(&'static str),
}

impl VerifyError {
    /// True when the token itself is bad, as opposed to the key endpoint failing.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        !matches!(self, VerifyError::Fetch(_))
    }
}

/// Verifies an identity token from an external provider and extracts the profile.
#[async_trait]
pub trait IdTokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<OAuthProfile, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    n: String,
    #[serde(default)]
    e: String,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

struct CachedKeys {
    keys: HashMap<String, Jwk>,
    expires_at: Instant,
}

/// Verifies Google ID tokens against Google's published JWKS.
/// Keys are cached for the `max-age` the certs endpoint advertises.
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    certs_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleVerifier {
    #[must_use]
    pub fn new(client_id: String) -> Self {
        Self::with_certs_url(client_id, GOOGLE_CERTS_URL.to_string())
    }

    #[must_use]
    pub fn with_certs_url(client_id: String, certs_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
            certs_url,
            cache: RwLock::new(None),
        }
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.expires_at > Instant::now()) {
                if let Some(jwk) = cached.keys.get(kid) {
                    return rsa_key(jwk);
                }
            }
        }

        // Unknown kid or stale cache: Google may have rotated keys.
        let fresh = self.fetch_keys().await?;
        let key = fresh
            .keys
            .get(kid)
            .ok_or_else(|| VerifyError::KeyNotFound(kid.to_string()))
            .and_then(rsa_key);
        *self.cache.write().await = Some(fresh);
        key
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, VerifyError> {
        let response = self
            .client
            .get(&self.certs_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| VerifyError::Fetch(e.to_string()))?;

        let max_age = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(0);

        let jwks = response
            .json::<JwksResponse>()
            .await
            .map_err(|e| VerifyError::Fetch(e.to_string()))?;

        tracing::debug!("Fetched {} Google signing keys (max-age {}s)", jwks.keys.len(), max_age);

        Ok(CachedKeys {
            keys: jwks.keys.into_iter().map(|k| (k.kid.clone(), k)).collect(),
            expires_at: Instant::now() + Duration::from_secs(max_age),
        })
    }
}

#[async_trait]
impl IdTokenVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<OAuthProfile, VerifyError> {
        let header = decode_header(id_token).map_err(|e| VerifyError::Header(e.to_string()))?;
        let kid = header.kid.ok_or(VerifyError::MissingKid)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        let claims = decode::<GoogleClaims>(id_token, &key, &validation)
            .map_err(|e| VerifyError::Invalid(e.to_string()))?
            .claims;

        profile_from_claims(claims)
    }
}

fn rsa_key(jwk: &Jwk) -> Result<DecodingKey, VerifyError> {
    if jwk.kty != "RSA" {
        return Err(VerifyError::UnsupportedKeyType(jwk.kty.clone()));
    }
    DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| VerifyError::Invalid(e.to_string()))
}

fn profile_from_claims(claims: GoogleClaims) -> Result<OAuthProfile, VerifyError> {
    let subject = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(VerifyError::MissingClaim("sub"))?;
    let email = claims
        .email
        .filter(|s| !s.is_empty())
        .ok_or(VerifyError::MissingClaim("email"))?;

    Ok(OAuthProfile {
        provider: PROVIDER.to_string(),
        subject,
        email,
        name: claims.name.filter(|s| !s.trim().is_empty()),
        photo: claims.picture.filter(|s| !s.trim().is_empty()),
    })
}

fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|age| age.parse().ok())
}
