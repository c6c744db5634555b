use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use cookie::Cookie;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::{MAX_SESSION_TTL_MINUTES, SessionConfig};
use crate::error::{Error, Result};

const GENERATED_SECRET_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies the signed session tokens carried in the session cookie.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        let secret = match &config.secret {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "No session secret configured; generated a random one. Sessions will not survive a restart."
                );
                generate_secret()
            }
        };

        Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            config,
        }
    }

    /// Configured lifetime, capped so expiry arithmetic cannot overflow.
    fn ttl_minutes(&self) -> i64 {
        self.config.ttl_minutes.min(MAX_SESSION_TTL_MINUTES)
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Signs a session token for the given user id.
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_minutes() * 60,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Config(format!("failed to sign session: {e}")))
    }

    /// Returns the user id of a valid, unexpired session token.
    pub fn verify(&self, token: &str) -> Result<String> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected session token: {e}");
            Error::Unauthorized
        })?;
        Ok(data.claims.sub)
    }

    /// Reads the session token from a Bearer header, falling back to the session cookie.
    #[must_use]
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|part| Cookie::parse(part.trim().to_string()).ok())
            .find(|c| c.name() == self.config.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        let mut cookie = self.base_cookie(token.to_string());
        cookie.set_max_age(time::Duration::minutes(self.ttl_minutes()));
        cookie
    }

    /// Cookie that clears the session in the browser.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.set_max_age(time::Duration::ZERO);
        cookie
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.config.cookie_name.clone(), value);
        cookie.set_http_only(true);
        cookie.set_secure(self.config.cookie_secure);
        cookie.set_same_site(self.config.cookie_same_site.to_cookie());
        if let Some(domain) = &self.config.cookie_domain {
            cookie.set_domain(domain.clone());
        }
        cookie.set_path("/");
        cookie
    }
}

fn generate_secret() -> Vec<u8> {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes).into_bytes()
}
