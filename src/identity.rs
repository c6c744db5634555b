//! Account registration and sign-in.
//!
//! Emails are normalized (trimmed, lower-cased) before any lookup so that
//! `Ana@Example.com ` and `ana@example.com` name the same account.

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{PasswordHasher, validate_password};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::store::normalize::normalize_email;
use crate::types::{OAuthProfile, User};

pub const MAX_NAME_LEN: usize = 120;

fn normalize_name(name: Option<&str>) -> Result<Option<String>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::validation(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(Some(name.to_string()))
}

/// Creates a password account. A taken email yields `AlreadyExists`,
/// including when a concurrent registration wins the insert.
pub fn register(
    store: &dyn Store,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<User> {
    let email = normalize_email(email)?;
    validate_password(password)?;
    let name = normalize_name(name)?;

    if store.get_user_by_email(&email)?.is_some() {
        return Err(Error::AlreadyExists);
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        name,
        photo: None,
        password_hash: Some(hasher.hash(password)?),
        created_at: Utc::now(),
    };
    store.create_user(&user)?;

    tracing::info!("Registered user {}", user.id);
    Ok(user)
}

/// Verifies a password login. Unknown emails, OAuth-only accounts and wrong
/// passwords are indistinguishable to the caller.
pub fn login(
    store: &dyn Store,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User> {
    let email = normalize_email(email).map_err(|_| Error::InvalidCredentials)?;

    let user = store
        .get_user_by_email(&email)?
        .ok_or(Error::InvalidCredentials)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(Error::InvalidCredentials)?;

    if !hasher.verify(password, hash)? {
        return Err(Error::InvalidCredentials);
    }

    Ok(user)
}

/// Signs in through an external identity. Finds the user by linked identity,
/// then by email, creating the account and link when neither exists.
pub fn login_oauth(store: &dyn Store, profile: &OAuthProfile) -> Result<User> {
    if profile.subject.trim().is_empty() {
        return Err(Error::validation("Identity subject cannot be empty"));
    }

    let profile = OAuthProfile {
        provider: profile.provider.clone(),
        subject: profile.subject.clone(),
        email: normalize_email(&profile.email)?,
        name: normalize_name(profile.name.as_deref())?,
        photo: profile
            .photo
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    };

    let user = store.resolve_oauth_user(&profile)?;
    tracing::debug!("Resolved {} identity to user {}", profile.provider, user.id);
    Ok(user)
}
