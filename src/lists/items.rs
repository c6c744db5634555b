use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::access::require_editor;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ItemPatch, ListItem, NewItem};

/// Largest accepted quantity: 999 999 999.999.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 3);
pub const MAX_QUANTITY_SCALE: u32 = 3;

/// Quantities are positive, bounded, with at most three fractional digits.
pub fn validate_quantity(quantity: Decimal) -> Result<Decimal> {
    let quantity = quantity.normalize();
    if quantity <= Decimal::ZERO {
        return Err(Error::validation("Quantity must be greater than zero"));
    }
    if quantity.scale() > MAX_QUANTITY_SCALE {
        return Err(Error::validation(format!(
            "Quantity cannot have more than {MAX_QUANTITY_SCALE} decimal places"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(Error::validation("Quantity is too large"));
    }
    Ok(quantity)
}

pub fn validate_price(price: i64) -> Result<()> {
    if price < 0 {
        return Err(Error::validation("Price cannot be negative"));
    }
    Ok(())
}

/// Adds a product to a list.
///
/// The product is created in the catalog if new, the actor's touch is recorded
/// as `added`, and a positive price becomes the product's last known price.
/// A product already on the list yields `DuplicateItem` and changes nothing.
pub fn add_item(
    store: &dyn Store,
    list_id: &str,
    actor_id: &str,
    product_name: &str,
    quantity: Decimal,
    unit_id: Option<i64>,
    price: i64,
) -> Result<ListItem> {
    require_editor(store, list_id, actor_id)?;

    let quantity = validate_quantity(quantity)?;
    validate_price(price)?;

    let item = store.add_item(&NewItem {
        id: Uuid::new_v4().to_string(),
        list_id: list_id.to_string(),
        product_name: product_name.to_string(),
        quantity,
        unit_id,
        price,
        actor_id: actor_id.to_string(),
        created_at: Utc::now(),
    })?;

    tracing::debug!("User {actor_id} added item {} to list {list_id}", item.id);
    Ok(item)
}

/// Applies a partial update. See [`ItemPatch::touch_action`] for which action
/// the actor's touch records.
pub fn patch_item(
    store: &dyn Store,
    list_id: &str,
    item_id: &str,
    actor_id: &str,
    patch: &ItemPatch,
) -> Result<ListItem> {
    require_editor(store, list_id, actor_id)?;

    let mut patch = patch.clone();
    if let Some(quantity) = patch.quantity {
        patch.quantity = Some(validate_quantity(quantity)?);
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }

    store.patch_item(list_id, item_id, actor_id, &patch)
}

pub fn delete_item(store: &dyn Store, list_id: &str, item_id: &str, actor_id: &str) -> Result<()> {
    let (_, role) = require_editor(store, list_id, actor_id)?;
    if !role.can_delete_items() {
        return Err(Error::AccessDenied);
    }

    if !store.delete_item(list_id, item_id)? {
        return Err(Error::NotFound);
    }
    Ok(())
}
