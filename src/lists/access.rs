use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Role, ShoppingList};

/// Resolves the caller's role on a list they already loaded.
/// The owner is recognised by id; everyone else needs a share row.
pub fn role_for(store: &dyn Store, list: &ShoppingList, user_id: &str) -> Result<Role> {
    if list.owner_id == user_id {
        return Ok(Role::Owner);
    }

    let share = store.get_share(&list.id, user_id)?;
    Ok(share.map(|s| s.role).unwrap_or(Role::None))
}

/// Returns the user's role on a list, or `Role::None` if the list does not exist.
pub fn role_of(store: &dyn Store, list_id: &str, user_id: &str) -> Result<Role> {
    match store.get_list(list_id)? {
        Some(list) => role_for(store, &list, user_id),
        None => Ok(Role::None),
    }
}

/// Returns true if the user may change the list's items.
pub fn can_edit(store: &dyn Store, list_id: &str, user_id: &str) -> Result<bool> {
    Ok(role_of(store, list_id, user_id)?.can_edit())
}

/// Loads a list the user can at least read.
pub fn require_access(
    store: &dyn Store,
    list_id: &str,
    user_id: &str,
) -> Result<(ShoppingList, Role)> {
    let list = store.get_list(list_id)?.ok_or(Error::NotFound)?;
    let role = role_for(store, &list, user_id)?;

    if !role.can_read() {
        return Err(Error::AccessDenied);
    }

    Ok((list, role))
}

/// Loads a list the user can edit (owner or editor).
pub fn require_editor(
    store: &dyn Store,
    list_id: &str,
    user_id: &str,
) -> Result<(ShoppingList, Role)> {
    let (list, role) = require_access(store, list_id, user_id)?;

    if !role.can_edit() {
        return Err(Error::AccessDenied);
    }

    Ok((list, role))
}

/// Loads a list the user owns.
pub fn require_owner(store: &dyn Store, list_id: &str, user_id: &str) -> Result<ShoppingList> {
    let (list, role) = require_access(store, list_id, user_id)?;

    if !role.can_delete_list() {
        return Err(Error::AccessDenied);
    }

    Ok(list)
}
