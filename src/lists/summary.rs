use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{ListItem, ListSummary};

fn line_total(item: &ListItem) -> Result<Decimal> {
    Decimal::from(item.price)
        .checked_mul(item.quantity)
        .ok_or(Error::Overflow)
}

/// Truncates toward zero after the exact sum, never per line.
fn to_minor_units(total: Decimal) -> Result<i64> {
    total.trunc().to_i64().ok_or(Error::Overflow)
}

/// Computes item count and purchased/pending totals for a set of items.
pub fn compute<'a, I>(items: I) -> Result<ListSummary>
where
    I: IntoIterator<Item = &'a ListItem>,
{
    let mut item_count: i64 = 0;
    let mut purchased = Decimal::ZERO;
    let mut pending = Decimal::ZERO;

    for item in items {
        item_count += 1;
        let total = line_total(item)?;
        let bucket = if item.purchased {
            &mut purchased
        } else {
            &mut pending
        };
        *bucket = bucket.checked_add(total).ok_or(Error::Overflow)?;
    }

    Ok(ListSummary {
        item_count,
        purchased_total: to_minor_units(purchased)?,
        pending_total: to_minor_units(pending)?,
    })
}

/// Recomputes the summary of a list from its current items.
pub fn summary(store: &dyn Store, list_id: &str) -> Result<ListSummary> {
    let items = store.list_items(list_id)?;
    compute(items.iter().map(|detail| &detail.item))
}
