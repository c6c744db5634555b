//! Global product and unit catalogs used for autocomplete.

use crate::error::Result;
use crate::store::Store;
use crate::types::{ProductMatch, Unit};

pub const PRODUCT_SEARCH_LIMIT: i32 = 12;
pub const UNIT_SEARCH_LIMIT: i32 = 20;

pub const DEFAULT_UNITS: &[&str] = &[
    "unit", "pack", "box", "bag", "bottle", "can", "jar", "dozen", "g", "kg", "lb", "oz", "ml",
    "l", "bunch",
];

pub const DEFAULT_PRODUCTS: &[&str] = &[
    "MILK", "EGGS", "BREAD", "BUTTER", "RICE", "SUGAR", "SALT", "COFFEE", "TOMATO", "ONION",
    "POTATO", "APPLES", "BANANAS", "CHICKEN", "CHEESE",
];

/// Products whose normalized name contains the query, ordered by name.
/// An empty query lists the first products alphabetically.
pub fn search_products(store: &dyn Store, q: &str) -> Result<Vec<ProductMatch>> {
    store.search_products(q, PRODUCT_SEARCH_LIMIT)
}

pub fn search_units(store: &dyn Store, q: &str) -> Result<Vec<Unit>> {
    store.search_units(q, UNIT_SEARCH_LIMIT)
}

/// Inserts the starter units and products. Safe to run repeatedly.
pub fn seed(store: &dyn Store) -> Result<()> {
    for unit in DEFAULT_UNITS {
        store.get_or_create_unit(unit)?;
    }
    for product in DEFAULT_PRODUCTS {
        store.get_or_create_product(product, None)?;
    }
    tracing::info!(
        "Seeded catalog with {} units and {} products",
        DEFAULT_UNITS.len(),
        DEFAULT_PRODUCTS.len()
    );
    Ok(())
}
