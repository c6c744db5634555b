use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Short label used for "touched by" indicators.
    #[must_use]
    pub fn display_label(&self) -> String {
        display_label(self.name.as_deref(), &self.email)
    }
}

/// Falls back to the upper-cased local part of the email when no name is set.
pub fn display_label(name: Option<&str>, email: &str) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => n.to_string(),
        _ => email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_uppercase(),
    }
}

/// Profile returned by an external identity provider once its token is verified.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthLink {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListShare {
    pub list_id: String,
    pub user_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member of a list as shown to other members.
#[derive(Debug, Clone, Serialize)]
pub struct ListMember {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: String,
    pub list_id: String,
    pub token: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Product search hit enriched with the last recorded price and most recently used unit.
#[derive(Debug, Clone, Serialize)]
pub struct ProductMatch {
    pub id: i64,
    pub name: String,
    pub last_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_unit_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_unit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLastPrice {
    pub product_id: i64,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub list_id: String,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<i64>,
    pub quantity: Decimal,
    pub price: i64,
    pub purchased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item row joined with its product and unit names plus "touched by" labels.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: ListItem,
    pub product: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub touched_by: Vec<String>,
}

/// Input for adding an item; the product name is normalized by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: String,
    pub list_id: String,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_id: Option<i64>,
    pub price: i64,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update for an item. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit_id: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub purchased: Option<bool>,
}

impl ItemPatch {
    /// The action recorded for a touch: fields are applied in the order
    /// quantity, unit, price, purchased and the last tagged field wins.
    #[must_use]
    pub fn touch_action(&self) -> Option<TouchAction> {
        let mut action = None;
        if self.quantity.is_some() {
            action = Some(TouchAction::Quantity);
        }
        if self.price.is_some() {
            action = Some(TouchAction::Price);
        }
        if self.purchased.is_some() {
            action = Some(TouchAction::Purchased);
        }
        action
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchAction {
    Added,
    Quantity,
    Price,
    Purchased,
}

impl TouchAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TouchAction::Added => "added",
            TouchAction::Quantity => "quantity",
            TouchAction::Price => "price",
            TouchAction::Purchased => "purchased",
        }
    }

    pub fn parse(s: &str) -> Option<TouchAction> {
        match s {
            "added" => Some(TouchAction::Added),
            "quantity" => Some(TouchAction::Quantity),
            "price" => Some(TouchAction::Price),
            "purchased" => Some(TouchAction::Purchased),
            _ => None,
        }
    }
}

impl fmt::Display for TouchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTouch {
    pub item_id: String,
    pub user_id: String,
    pub action: TouchAction,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub item_count: i64,
    pub purchased_total: i64,
    pub pending_total: i64,
}

/// A list as seen by one user: their role plus current totals.
#[derive(Debug, Clone, Serialize)]
pub struct ListOverview {
    #[serde(flatten)]
    pub list: ShoppingList,
    pub is_owner: bool,
    pub role: Role,
    #[serde(flatten)]
    pub summary: ListSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListDetail {
    #[serde(flatten)]
    pub list: ShoppingList,
    pub is_owner: bool,
    pub role: Role,
    pub items: Vec<ItemDetail>,
    #[serde(flatten)]
    pub summary: ListSummary,
}
