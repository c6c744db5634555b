//! Role-bearing invite links.
//!
//! A token is `e_` or `l_` followed by 32 random bytes in unpadded base64url.
//! The prefix alone decides the role granted on redemption.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use uuid::Uuid;

use super::access::{require_access, require_editor, require_owner};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ListMember, ListShare, Role, ShareLink, ShoppingList};

const TOKEN_BYTES: usize = 32;
const MAX_TOKEN_ATTEMPTS: usize = 3;
const EDITOR_PREFIX: &str = "e_";
const READER_PREFIX: &str = "l_";

fn prefix_for(role: Role) -> Result<&'static str> {
    match role {
        Role::Editor => Ok(EDITOR_PREFIX),
        Role::Reader => Ok(READER_PREFIX),
        other => Err(Error::validation(format!(
            "Links can grant editor or reader, not {other}"
        ))),
    }
}

/// Generates a fresh token for the given grantable role.
pub fn generate_token(role: Role) -> Result<String> {
    let prefix = prefix_for(role)?;
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Ok(format!("{prefix}{}", URL_SAFE_NO_PAD.encode(bytes)))
}

/// Role encoded in a token's prefix.
#[must_use]
pub fn role_from_token(token: &str) -> Option<Role> {
    if token.starts_with(EDITOR_PREFIX) {
        Some(Role::Editor)
    } else if token.starts_with(READER_PREFIX) {
        Some(Role::Reader)
    } else {
        None
    }
}

#[must_use]
pub fn share_url(app_base_url: &str, token: &str) -> String {
    format!("{}/share/{token}", app_base_url.trim_end_matches('/'))
}

/// Issues a new active link. Requires edit rights on the list.
pub fn create_link(
    store: &dyn Store,
    list_id: &str,
    creator_id: &str,
    role: Role,
) -> Result<ShareLink> {
    require_editor(store, list_id, creator_id)?;

    for attempt in 1..=MAX_TOKEN_ATTEMPTS {
        let link = ShareLink {
            id: Uuid::new_v4().to_string(),
            list_id: list_id.to_string(),
            token: generate_token(role)?,
            active: true,
            created_by: Some(creator_id.to_string()),
            created_at: Utc::now(),
        };

        match store.create_share_link(&link) {
            Ok(()) => {
                tracing::info!("Created {role} link {} for list {list_id}", link.id);
                return Ok(link);
            }
            Err(Error::TokenCollision) => {
                tracing::warn!("Share token collision on attempt {attempt}, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::TokenCollision)
}

/// Redeems a link for the given user and returns the role they now hold.
///
/// The owner keeps `Owner` and nothing is written. Anyone else gets a share
/// with the token's role, replacing any role they held before, so redeeming
/// the same link twice is a no-op.
pub fn redeem_link(
    store: &dyn Store,
    token: &str,
    user_id: &str,
) -> Result<(ShoppingList, Role)> {
    let link = store
        .get_active_share_link(token)?
        .ok_or(Error::InvalidLink)?;
    let role = role_from_token(&link.token).ok_or(Error::InvalidLink)?;
    let list = store.get_list(&link.list_id)?.ok_or(Error::InvalidLink)?;

    if list.owner_id == user_id {
        return Ok((list, Role::Owner));
    }

    let now = Utc::now();
    let share = ListShare {
        list_id: list.id.clone(),
        user_id: user_id.to_string(),
        role,
        created_at: now,
        updated_at: now,
    };

    match store.upsert_share(&share) {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(Error::InvalidLink),
        Err(e) => return Err(e),
    }

    tracing::info!("User {user_id} joined list {} as {role}", list.id);
    Ok((list, role))
}

/// Lists every link of a list, active or not. Requires edit rights.
pub fn list_links(store: &dyn Store, list_id: &str, user_id: &str) -> Result<Vec<ShareLink>> {
    require_editor(store, list_id, user_id)?;
    store.list_share_links(list_id)
}

/// Deactivates a link so it can no longer be redeemed. Existing shares stay.
pub fn deactivate_link(
    store: &dyn Store,
    list_id: &str,
    link_id: &str,
    user_id: &str,
) -> Result<()> {
    require_editor(store, list_id, user_id)?;

    if !store.deactivate_share_link(list_id, link_id)? {
        return Err(Error::NotFound);
    }

    tracing::info!("Deactivated link {link_id} on list {list_id}");
    Ok(())
}

pub fn list_members(store: &dyn Store, list_id: &str, user_id: &str) -> Result<Vec<ListMember>> {
    require_access(store, list_id, user_id)?;
    store.list_members(list_id)
}

/// Revokes a member's share. Only the owner may do this, and the owner cannot be removed.
pub fn remove_member(
    store: &dyn Store,
    list_id: &str,
    member_id: &str,
    user_id: &str,
) -> Result<()> {
    let list = require_owner(store, list_id, user_id)?;

    if list.owner_id == member_id {
        return Err(Error::validation("The list owner cannot be removed"));
    }

    if !store.delete_share(list_id, member_id)? {
        return Err(Error::NotFound);
    }

    tracing::info!("Removed user {member_id} from list {list_id}");
    Ok(())
}
