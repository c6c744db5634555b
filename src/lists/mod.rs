//! Shopping lists: access control, sharing, items and totals.

pub mod access;
pub mod items;
pub mod sharing;
pub mod summary;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ListDetail, ListOverview, Role, ShoppingList};

pub const MAX_LIST_NAME_LEN: usize = 200;

fn validate_list_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("List name cannot be empty"));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(Error::validation(format!(
            "List name cannot exceed {MAX_LIST_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn create_list(
    store: &dyn Store,
    owner_id: &str,
    name: &str,
    photo: Option<&str>,
) -> Result<ShoppingList> {
    let list = ShoppingList {
        id: Uuid::new_v4().to_string(),
        name: validate_list_name(name)?,
        photo: photo
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string),
        owner_id: owner_id.to_string(),
        created_at: Utc::now(),
    };
    store.create_list(&list)?;

    tracing::info!("User {owner_id} created list {}", list.id);
    Ok(list)
}

/// Lists owned by or shared with the user, newest first, with their totals.
pub fn lists_for_user(store: &dyn Store, user_id: &str) -> Result<Vec<ListOverview>> {
    store
        .list_user_lists(user_id)?
        .into_iter()
        .map(|(list, role)| {
            let summary = summary::summary(store, &list.id)?;
            Ok(ListOverview {
                is_owner: role == Role::Owner,
                role,
                summary,
                list,
            })
        })
        .collect()
}

/// Full view of a list for a member: items by product name plus totals.
pub fn list_detail(store: &dyn Store, list_id: &str, user_id: &str) -> Result<ListDetail> {
    let (list, role) = access::require_access(store, list_id, user_id)?;
    let items = store.list_items(&list.id)?;
    let summary = summary::compute(items.iter().map(|detail| &detail.item))?;

    Ok(ListDetail {
        is_owner: role == Role::Owner,
        role,
        items,
        summary,
        list,
    })
}

/// Deletes a list with its items, shares and links. Owner only.
pub fn delete_list(store: &dyn Store, list_id: &str, user_id: &str) -> Result<()> {
    let list = access::require_owner(store, list_id, user_id)?;

    if !store.delete_list(&list.id)? {
        return Err(Error::NotFound);
    }

    tracing::info!("User {user_id} deleted list {list_id}");
    Ok(())
}
