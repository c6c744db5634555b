pub mod normalize;
mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every mutating operation is atomic: side-effect writes (touches, price memory,
/// catalog get-or-create) commit or roll back together with the primary write.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn resolve_oauth_user(&self, profile: &OAuthProfile) -> Result<User>;
    fn get_oauth_link(&self, provider: &str, subject: &str) -> Result<Option<OAuthLink>>;

    // List operations
    fn create_list(&self, list: &ShoppingList) -> Result<()>;
    fn get_list(&self, id: &str) -> Result<Option<ShoppingList>>;
    fn list_user_lists(&self, user_id: &str) -> Result<Vec<(ShoppingList, Role)>>;
    fn delete_list(&self, id: &str) -> Result<bool>;

    // Share operations
    fn get_share(&self, list_id: &str, user_id: &str) -> Result<Option<ListShare>>;
    fn upsert_share(&self, share: &ListShare) -> Result<()>;
    fn delete_share(&self, list_id: &str, user_id: &str) -> Result<bool>;
    fn list_members(&self, list_id: &str) -> Result<Vec<ListMember>>;

    // Share link operations
    fn create_share_link(&self, link: &ShareLink) -> Result<()>;
    fn get_active_share_link(&self, token: &str) -> Result<Option<ShareLink>>;
    fn list_share_links(&self, list_id: &str) -> Result<Vec<ShareLink>>;
    fn deactivate_share_link(&self, list_id: &str, link_id: &str) -> Result<bool>;

    // Catalog operations
    fn get_or_create_product(&self, name: &str, created_by: Option<&str>) -> Result<Product>;
    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>>;
    fn search_products(&self, q: &str, limit: i32) -> Result<Vec<ProductMatch>>;
    fn get_or_create_unit(&self, name: &str) -> Result<Unit>;
    fn search_units(&self, q: &str, limit: i32) -> Result<Vec<Unit>>;
    fn get_product_last_price(&self, product_id: i64) -> Result<Option<ProductLastPrice>>;

    // Item operations
    fn add_item(&self, item: &NewItem) -> Result<ListItem>;
    fn patch_item(
        &self,
        list_id: &str,
        item_id: &str,
        actor_id: &str,
        patch: &ItemPatch,
    ) -> Result<ListItem>;
    fn delete_item(&self, list_id: &str, item_id: &str) -> Result<bool>;
    fn list_items(&self, list_id: &str) -> Result<Vec<ItemDetail>>;
    fn list_item_touches(&self, item_id: &str) -> Result<Vec<ItemTouch>>;
}
