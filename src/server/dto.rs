use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Role, ShareLink, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// Returned by every sign-in endpoint. The token is also set as the session cookie.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product: String,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_id: Option<i64>,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkRequest {
    /// "editor" or "reader"; defaults to editor.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    #[serde(flatten)]
    pub link: ShareLink,
    pub role: Option<Role>,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub list_id: String,
    pub list_name: String,
    pub role: Role,
}
