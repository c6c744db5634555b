use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::Store;
use super::normalize::{
    escape_like, normalize_product_name, normalize_search_term, normalize_unit_name,
};
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::lists::summary;
use crate::types::*;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_TOUCH_LABELS: usize = 6;

const USER_COLUMNS: &str = "id, email, name, photo, password_hash, created_at";
const LIST_COLUMNS: &str = "id, name, photo, owner_id, created_at";
const LINK_COLUMNS: &str = "id, list_id, token, active, created_by, created_at";
const ITEM_COLUMNS: &str = "id, list_id, product_id, unit_id, quantity, price, purchased, \
                            created_by, updated_by, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_decimal(idx: usize, s: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn format_decimal(d: &Decimal) -> String {
    d.normalize().to_string()
}

fn parse_role(idx: usize, s: &str) -> rusqlite::Result<Role> {
    Role::parse(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown role '{s}'").into(),
        )
    })
}

fn parse_action(idx: usize, s: &str) -> rusqlite::Result<TouchAction> {
    TouchAction::parse(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown touch action '{s}'").into(),
        )
    })
}

/// True for UNIQUE and PRIMARY KEY violations, but not foreign key or CHECK failures.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
        }
        _ => false,
    }
}

/// True when a row references a parent that does not exist, such as a list
/// deleted between the access check and the write.
fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        }
        _ => false,
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        photo: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<ShoppingList> {
    Ok(ShoppingList {
        id: row.get(0)?,
        name: row.get(1)?,
        photo: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<ShareLink> {
    Ok(ShareLink {
        id: row.get(0)?,
        list_id: row.get(1)?,
        token: row.get(2)?,
        active: row.get(3)?,
        created_by: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        created_by: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ListItem> {
    Ok(ListItem {
        id: row.get(0)?,
        list_id: row.get(1)?,
        product_id: row.get(2)?,
        unit_id: row.get(3)?,
        quantity: parse_decimal(4, &row.get::<_, String>(4)?)?,
        price: row.get(5)?,
        purchased: row.get(6)?,
        created_by: row.get(7)?,
        updated_by: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
        updated_at: parse_datetime(&row.get::<_, String>(10)?),
    })
}

/// Inserts the product if its normalized name is new, then returns the stored row.
/// Concurrent creators converge on the same row through the UNIQUE(name) index.
fn get_or_create_product_in(
    conn: &Connection,
    name: &str,
    created_by: Option<&str>,
) -> Result<Product> {
    conn.execute(
        "INSERT INTO products (name, created_by, created_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (name) DO NOTHING",
        params![name, created_by, format_datetime(&Utc::now())],
    )?;

    conn.query_row(
        "SELECT id, name, created_by, created_at FROM products WHERE name = ?1",
        params![name],
        product_from_row,
    )
    .map_err(Error::from)
}

fn ensure_unit_exists(conn: &Connection, unit_id: i64) -> Result<()> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM units WHERE id = ?1",
            params![unit_id],
            |_| Ok(()),
        )
        .optional()?;

    exists.ok_or_else(|| Error::validation(format!("Unknown unit: {unit_id}")))
}

fn upsert_touch(
    conn: &Connection,
    item_id: &str,
    user_id: &str,
    action: TouchAction,
    at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO item_touches (item_id, user_id, action, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (item_id, user_id) DO UPDATE SET
            action = excluded.action,
            updated_at = excluded.updated_at",
        params![item_id, user_id, action.as_str(), at],
    )?;
    Ok(())
}

fn record_last_price(
    conn: &Connection,
    product_id: i64,
    price: i64,
    user_id: &str,
    at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO product_prices (product_id, price, recorded_by, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (product_id) DO UPDATE SET
            price = excluded.price,
            recorded_by = excluded.recorded_by,
            updated_at = excluded.updated_at",
        params![product_id, price, user_id, at],
    )?;
    Ok(())
}

/// Fails with a validation error if the list's totals no longer fit in minor units.
fn ensure_totals_fit(conn: &Connection, list_id: &str) -> Result<()> {
    let mut stmt =
        conn.prepare(&format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE list_id = ?1"))?;
    let items = stmt
        .query_map(params![list_id], item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match summary::compute(&items) {
        Ok(_) => Ok(()),
        Err(Error::Overflow) => Err(Error::validation(
            "List total would exceed the largest supported amount",
        )),
        Err(e) => Err(e),
    }
}

fn get_item_in(conn: &Connection, list_id: &str, item_id: &str) -> Result<Option<ListItem>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM list_items WHERE id = ?1 AND list_id = ?2"),
        params![item_id, list_id],
        item_from_row,
    )
    .optional()
    .map_err(Error::from)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, email, name, photo, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.name,
                user.photo,
                user.password_hash,
                format_datetime(&user.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn resolve_oauth_user(&self, profile: &OAuthProfile) -> Result<User> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = format_datetime(&Utc::now());

        let linked: Option<String> = tx
            .query_row(
                "SELECT user_id FROM oauth_links WHERE provider = ?1 AND subject = ?2",
                params![profile.provider, profile.subject],
                |row| row.get(0),
            )
            .optional()?;

        let user_id = match linked {
            Some(user_id) => user_id,
            None => {
                tx.execute(
                    "INSERT INTO users (id, email, name, photo, password_hash, created_at)
                     VALUES (?1, ?2, ?3, ?4, NULL, ?5)
                     ON CONFLICT (email) DO NOTHING",
                    params![
                        Uuid::new_v4().to_string(),
                        profile.email,
                        profile.name,
                        profile.photo,
                        now,
                    ],
                )?;

                let user_id: String = tx.query_row(
                    "SELECT id FROM users WHERE email = ?1",
                    params![profile.email],
                    |row| row.get(0),
                )?;

                let result = tx.execute(
                    "INSERT INTO oauth_links (id, user_id, provider, subject, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        Uuid::new_v4().to_string(),
                        user_id,
                        profile.provider,
                        profile.subject,
                        now,
                    ],
                );
                match result {
                    Ok(_) => {}
                    Err(e) if is_unique_violation(&e) => return Err(Error::AlreadyExists),
                    Err(e) => return Err(Error::from(e)),
                }

                user_id
            }
        };

        // Profile data from the provider only fills gaps, it never overwrites.
        tx.execute(
            "UPDATE users SET name = COALESCE(name, ?2), photo = COALESCE(photo, ?3)
             WHERE id = ?1",
            params![user_id, profile.name, profile.photo],
        )?;

        let user = tx.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![user_id],
            user_from_row,
        )?;

        tx.commit()?;
        Ok(user)
    }

    fn get_oauth_link(&self, provider: &str, subject: &str) -> Result<Option<OAuthLink>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, provider, subject, created_at
             FROM oauth_links WHERE provider = ?1 AND subject = ?2",
            params![provider, subject],
            |row| {
                Ok(OAuthLink {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    provider: row.get(2)?,
                    subject: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // List operations

    fn create_list(&self, list: &ShoppingList) -> Result<()> {
        self.conn().execute(
            "INSERT INTO lists (id, name, photo, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                list.id,
                list.name,
                list.photo,
                list.owner_id,
                format_datetime(&list.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_list(&self, id: &str) -> Result<Option<ShoppingList>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
            params![id],
            list_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_user_lists(&self, user_id: &str) -> Result<Vec<(ShoppingList, Role)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT l.id, l.name, l.photo, l.owner_id, l.created_at, 'owner'
             FROM lists l WHERE l.owner_id = ?1
             UNION ALL
             SELECT l.id, l.name, l.photo, l.owner_id, l.created_at, s.role
             FROM lists l JOIN list_shares s ON s.list_id = l.id
             WHERE s.user_id = ?1
             ORDER BY 5 DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let list = list_from_row(row)?;
            let role = parse_role(5, &row.get::<_, String>(5)?)?;
            Ok((list, role))
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_list(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM lists WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Share operations

    fn get_share(&self, list_id: &str, user_id: &str) -> Result<Option<ListShare>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT list_id, user_id, role, created_at, updated_at
             FROM list_shares WHERE list_id = ?1 AND user_id = ?2",
            params![list_id, user_id],
            |row| {
                Ok(ListShare {
                    list_id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: parse_role(2, &row.get::<_, String>(2)?)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_share(&self, share: &ListShare) -> Result<()> {
        if !share.role.is_grantable() {
            return Err(Error::validation(format!(
                "Role '{}' cannot be granted",
                share.role
            )));
        }

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let owner_id: String = tx
            .query_row(
                "SELECT owner_id FROM lists WHERE id = ?1",
                params![share.list_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        if owner_id == share.user_id {
            return Err(Error::OwnerShare);
        }

        tx.execute(
            "INSERT INTO list_shares (list_id, user_id, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (list_id, user_id) DO UPDATE SET
                role = excluded.role,
                updated_at = excluded.updated_at
             WHERE list_shares.role <> excluded.role",
            params![
                share.list_id,
                share.user_id,
                share.role.as_str(),
                format_datetime(&share.created_at),
                format_datetime(&share.updated_at),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn delete_share(&self, list_id: &str, user_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM list_shares WHERE list_id = ?1 AND user_id = ?2",
            params![list_id, user_id],
        )?;
        Ok(rows > 0)
    }

    fn list_members(&self, list_id: &str) -> Result<Vec<ListMember>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.id, u.email, u.name, 'owner', 0 AS ord
             FROM lists l JOIN users u ON u.id = l.owner_id
             WHERE l.id = ?1
             UNION ALL
             SELECT u.id, u.email, u.name, s.role, 1 AS ord
             FROM list_shares s JOIN users u ON u.id = s.user_id
             WHERE s.list_id = ?1
             ORDER BY 5, 2",
        )?;

        let rows = stmt.query_map(params![list_id], |row| {
            Ok(ListMember {
                user_id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                role: parse_role(3, &row.get::<_, String>(3)?)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Share link operations

    fn create_share_link(&self, link: &ShareLink) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO share_links (id, list_id, token, active, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                link.id,
                link.list_id,
                link.token,
                link.active,
                link.created_by,
                format_datetime(&link.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenCollision),
            Err(e) if is_foreign_key_violation(&e) => Err(Error::NotFound),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_active_share_link(&self, token: &str) -> Result<Option<ShareLink>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {LINK_COLUMNS} FROM share_links WHERE token = ?1 AND active = 1"),
            params![token],
            link_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_share_links(&self, list_id: &str) -> Result<Vec<ShareLink>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LINK_COLUMNS} FROM share_links WHERE list_id = ?1 ORDER BY created_at DESC"
        ))?;

        let rows = stmt.query_map(params![list_id], link_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn deactivate_share_link(&self, list_id: &str, link_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE share_links SET active = 0 WHERE id = ?1 AND list_id = ?2",
            params![link_id, list_id],
        )?;
        Ok(rows > 0)
    }

    // Catalog operations

    fn get_or_create_product(&self, name: &str, created_by: Option<&str>) -> Result<Product> {
        let name = normalize_product_name(name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let product = get_or_create_product_in(&tx, &name, created_by)?;
        tx.commit()?;

        Ok(product)
    }

    fn get_product_by_name(&self, name: &str) -> Result<Option<Product>> {
        let name = normalize_product_name(name)?;

        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_by, created_at FROM products WHERE name = ?1",
            params![name],
            product_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn search_products(&self, q: &str, limit: i32) -> Result<Vec<ProductMatch>> {
        let pattern = format!("%{}%", escape_like(&normalize_search_term(q)));

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT m.id, m.name, m.last_price, m.last_unit_id, u.name
             FROM (
                SELECT p.id, p.name, COALESCE(pp.price, 0) AS last_price,
                    (SELECT li.unit_id FROM list_items li
                     WHERE li.product_id = p.id AND li.unit_id IS NOT NULL
                     ORDER BY li.updated_at DESC, li.created_at DESC
                     LIMIT 1) AS last_unit_id
                FROM products p
                LEFT JOIN product_prices pp ON pp.product_id = p.id
                WHERE p.name LIKE ?1 ESCAPE '\\'
                ORDER BY p.name
                LIMIT ?2
             ) m
             LEFT JOIN units u ON u.id = m.last_unit_id
             ORDER BY m.name",
        )?;

        let rows = stmt.query_map(params![pattern, limit], |row| {
            Ok(ProductMatch {
                id: row.get(0)?,
                name: row.get(1)?,
                last_price: row.get(2)?,
                last_unit_id: row.get(3)?,
                last_unit: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_or_create_unit(&self, name: &str) -> Result<Unit> {
        let name = normalize_unit_name(name)?;

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO units (name, created_at) VALUES (?1, ?2)
             ON CONFLICT (name) DO NOTHING",
            params![name, format_datetime(&Utc::now())],
        )?;

        let unit = tx.query_row(
            "SELECT id, name FROM units WHERE name = ?1",
            params![name],
            |row| {
                Ok(Unit {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )?;

        tx.commit()?;
        Ok(unit)
    }

    fn search_units(&self, q: &str, limit: i32) -> Result<Vec<Unit>> {
        let pattern = format!("%{}%", escape_like(&normalize_search_term(q)));

        let conn = self.conn();
        // LIKE is case-insensitive for ASCII, so the upper-cased term matches lower-case names.
        let mut stmt = conn.prepare(
            "SELECT id, name FROM units WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![pattern, limit], |row| {
            Ok(Unit {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_product_last_price(&self, product_id: i64) -> Result<Option<ProductLastPrice>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT product_id, price, recorded_by, updated_at
             FROM product_prices WHERE product_id = ?1",
            params![product_id],
            |row| {
                Ok(ProductLastPrice {
                    product_id: row.get(0)?,
                    price: row.get(1)?,
                    recorded_by: row.get(2)?,
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Item operations

    fn add_item(&self, item: &NewItem) -> Result<ListItem> {
        let product_name = normalize_product_name(&item.product_name)?;
        let now = format_datetime(&item.created_at);

        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let product = get_or_create_product_in(&tx, &product_name, Some(&item.actor_id))?;

        if let Some(unit_id) = item.unit_id {
            ensure_unit_exists(&tx, unit_id)?;
        }

        let result = tx.execute(
            "INSERT INTO list_items (id, list_id, product_id, unit_id, quantity, price, purchased,
                                     created_by, updated_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7, ?8, ?8)",
            params![
                item.id,
                item.list_id,
                product.id,
                item.unit_id,
                format_decimal(&item.quantity),
                item.price,
                item.actor_id,
                now,
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(Error::DuplicateItem),
            Err(e) if is_foreign_key_violation(&e) => return Err(Error::NotFound),
            Err(e) => return Err(Error::from(e)),
        }

        ensure_totals_fit(&tx, &item.list_id)?;
        upsert_touch(&tx, &item.id, &item.actor_id, TouchAction::Added, &now)?;

        if item.price > 0 {
            record_last_price(&tx, product.id, item.price, &item.actor_id, &now)?;
        }

        let stored = get_item_in(&tx, &item.list_id, &item.id)?.ok_or(Error::NotFound)?;

        tx.commit()?;
        Ok(stored)
    }

    fn patch_item(
        &self,
        list_id: &str,
        item_id: &str,
        actor_id: &str,
        patch: &ItemPatch,
    ) -> Result<ListItem> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let mut item = get_item_in(&tx, list_id, item_id)?.ok_or(Error::NotFound)?;
        let now = Utc::now();
        let now_str = format_datetime(&now);

        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_id) = patch.unit_id {
            ensure_unit_exists(&tx, unit_id)?;
            item.unit_id = Some(unit_id);
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(purchased) = patch.purchased {
            item.purchased = purchased;
        }
        item.updated_by = Some(actor_id.to_string());
        item.updated_at = now;

        tx.execute(
            "UPDATE list_items
             SET quantity = ?1, unit_id = ?2, price = ?3, purchased = ?4,
                 updated_by = ?5, updated_at = ?6
             WHERE id = ?7 AND list_id = ?8",
            params![
                format_decimal(&item.quantity),
                item.unit_id,
                item.price,
                item.purchased,
                actor_id,
                now_str,
                item.id,
                item.list_id,
            ],
        )?;

        ensure_totals_fit(&tx, list_id)?;

        // Unlike add_item, an explicit price of 0 is remembered too.
        if let Some(price) = patch.price {
            record_last_price(&tx, item.product_id, price, actor_id, &now_str)?;
        }

        if let Some(action) = patch.touch_action() {
            upsert_touch(&tx, &item.id, actor_id, action, &now_str)?;
        }

        tx.commit()?;
        Ok(item)
    }

    fn delete_item(&self, list_id: &str, item_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM list_items WHERE id = ?1 AND list_id = ?2",
            params![item_id, list_id],
        )?;
        Ok(rows > 0)
    }

    fn list_items(&self, list_id: &str) -> Result<Vec<ItemDetail>> {
        let conn = self.conn();

        let mut touch_stmt = conn.prepare(
            "SELECT t.item_id, u.name, u.email
             FROM item_touches t
             JOIN users u ON u.id = t.user_id
             JOIN list_items li ON li.id = t.item_id
             WHERE li.list_id = ?1
             ORDER BY t.updated_at DESC",
        )?;
        let touches = touch_stmt.query_map(params![list_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        for touch in touches {
            let (item_id, name, email) = touch?;
            let entry = labels.entry(item_id).or_default();
            if entry.len() < MAX_TOUCH_LABELS {
                entry.push(display_label(name.as_deref(), &email));
            }
        }

        let mut stmt = conn.prepare(
            "SELECT li.id, li.list_id, li.product_id, li.unit_id, li.quantity, li.price,
                    li.purchased, li.created_by, li.updated_by, li.created_at, li.updated_at,
                    p.name, u.name
             FROM list_items li
             JOIN products p ON p.id = li.product_id
             LEFT JOIN units u ON u.id = li.unit_id
             WHERE li.list_id = ?1
             ORDER BY p.name",
        )?;

        let rows = stmt.query_map(params![list_id], |row| {
            Ok((item_from_row(row)?, row.get::<_, String>(11)?, row.get(12)?))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (item, product, unit) = row?;
            let touched_by = labels.remove(&item.id).unwrap_or_default();
            items.push(ItemDetail {
                item,
                product,
                unit,
                touched_by,
            });
        }
        Ok(items)
    }

    fn list_item_touches(&self, item_id: &str) -> Result<Vec<ItemTouch>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT item_id, user_id, action, updated_at
             FROM item_touches WHERE item_id = ?1 ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| {
            Ok(ItemTouch {
                item_id: row.get(0)?,
                user_id: row.get(1)?,
                action: parse_action(2, &row.get::<_, String>(2)?)?,
                updated_at: parse_datetime(&row.get::<_, String>(3)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn create_user(store: &SqliteStore, id: &str, email: &str) -> User {
        let user = User {
            id: id.to_string(),
            email: email.to_string(),
            name: None,
            photo: None,
            password_hash: None,
            created_at: Utc::now(),
        };
        store.create_user(&user).unwrap();
        user
    }

    fn create_list(store: &SqliteStore, id: &str, owner_id: &str) -> ShoppingList {
        let list = ShoppingList {
            id: id.to_string(),
            name: "Groceries".to_string(),
            photo: None,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };
        store.create_list(&list).unwrap();
        list
    }

    fn new_item(id: &str, list_id: &str, product: &str, actor: &str, price: i64) -> NewItem {
        NewItem {
            id: id.to_string(),
            list_id: list_id.to_string(),
            product_name: product.to_string(),
            quantity: Decimal::new(2, 0),
            unit_id: None,
            price,
            actor_id: actor.to_string(),
            created_at: Utc::now(),
        }
    }

    fn share(list_id: &str, user_id: &str, role: Role) -> ListShare {
        ListShare {
            list_id: list_id.to_string(),
            user_id: user_id.to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn count(store: &SqliteStore, sql: &str) -> i64 {
        store.conn().query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = test_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        for table in [
            "users",
            "oauth_links",
            "lists",
            "list_shares",
            "share_links",
            "products",
            "units",
            "product_prices",
            "list_items",
            "item_touches",
        ] {
            assert!(tables.contains(&table.to_string()), "missing {table}");
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_temp, store) = test_store();
        store.initialize().unwrap();
    }

    #[test]
    fn test_duplicate_email_already_exists() {
        let (_temp, store) = test_store();
        create_user(&store, "user-1", "ana@example.com");

        let dup = User {
            id: "user-2".to_string(),
            email: "ana@example.com".to_string(),
            name: None,
            photo: None,
            password_hash: None,
            created_at: Utc::now(),
        };
        assert!(matches!(store.create_user(&dup), Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_get_or_create_product_dedups_normalized_names() {
        let (_temp, store) = test_store();

        let first = store.get_or_create_product("tomato ", None).unwrap();
        let second = store.get_or_create_product("  TOMATO", None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.name, "TOMATO");
        assert_eq!(count(&store, "SELECT COUNT(*) FROM products"), 1);
    }

    #[test]
    fn test_add_item_records_touch_and_price() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        let item = store
            .add_item(&new_item("item-1", "list-1", "tomato ", "owner", 1500))
            .unwrap();

        assert_eq!(item.quantity, Decimal::new(2, 0));
        assert_eq!(item.updated_by.as_deref(), Some("owner"));
        assert!(!item.purchased);

        let touches = store.list_item_touches("item-1").unwrap();
        assert_eq!(touches.len(), 1);
        assert_eq!(touches[0].action, TouchAction::Added);

        let price = store
            .get_product_last_price(item.product_id)
            .unwrap()
            .unwrap();
        assert_eq!(price.price, 1500);
    }

    #[test]
    fn test_add_item_zero_price_not_remembered() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        let item = store
            .add_item(&new_item("item-1", "list-1", "salt", "owner", 0))
            .unwrap();

        assert!(store.get_product_last_price(item.product_id).unwrap().is_none());
    }

    #[test]
    fn test_add_item_duplicate_product() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        store
            .add_item(&new_item("item-1", "list-1", "tomato", "owner", 0))
            .unwrap();

        let result = store.add_item(&new_item("item-2", "list-1", " Tomato  ", "owner", 0));
        assert!(matches!(result, Err(Error::DuplicateItem)));
        assert_eq!(store.list_items("list-1").unwrap().len(), 1);
        assert!(store.list_item_touches("item-2").unwrap().is_empty());
    }

    #[test]
    fn test_add_item_unknown_unit_rolls_back_product() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        let mut item = new_item("item-1", "list-1", "brand new thing", "owner", 0);
        item.unit_id = Some(999);

        assert!(matches!(store.add_item(&item), Err(Error::Validation(_))));
        assert!(
            store
                .get_product_by_name("brand new thing")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_add_item_to_deleted_list_not_found() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");
        store.delete_list("list-1").unwrap();

        let result = store.add_item(&new_item("item-1", "list-1", "milk", "owner", 100));
        assert!(matches!(result, Err(Error::NotFound)));
        assert!(store.get_product_by_name("MILK").unwrap().is_none());
    }

    #[test]
    fn test_share_link_for_deleted_list_not_found() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");

        let link = ShareLink {
            id: "link-1".to_string(),
            list_id: "gone".to_string(),
            token: "e_orphan".to_string(),
            active: true,
            created_by: Some("owner".to_string()),
            created_at: Utc::now(),
        };
        assert!(matches!(
            store.create_share_link(&link),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_add_item_rejects_total_overflow() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        let result = store.add_item(&new_item("item-1", "list-1", "gold", "owner", i64::MAX));
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(store.list_items("list-1").unwrap().is_empty());
        assert!(store.get_product_by_name("GOLD").unwrap().is_none());
    }

    #[test]
    fn test_patch_item_rejects_total_overflow() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");
        let item = store
            .add_item(&new_item("item-1", "list-1", "gold", "owner", 100))
            .unwrap();

        let patch = ItemPatch {
            price: Some(i64::MAX),
            ..Default::default()
        };
        let result = store.patch_item("list-1", &item.id, "owner", &patch);
        assert!(matches!(result, Err(Error::Validation(_))));

        let items = store.list_items("list-1").unwrap();
        assert_eq!(items[0].item.price, 100);
        assert_eq!(
            store
                .get_product_last_price(item.product_id)
                .unwrap()
                .unwrap()
                .price,
            100
        );
        assert_eq!(
            store.list_item_touches(&item.id).unwrap()[0].action,
            TouchAction::Added
        );
    }

    #[test]
    fn test_patch_item_last_tag_wins_and_price_zero_remembered() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_user(&store, "editor", "editor@example.com");
        create_list(&store, "list-1", "owner");

        let item = store
            .add_item(&new_item("item-1", "list-1", "milk", "owner", 1500))
            .unwrap();

        let patch = ItemPatch {
            quantity: Some(Decimal::new(3, 0)),
            price: Some(0),
            ..Default::default()
        };
        let patched = store.patch_item("list-1", "item-1", "editor", &patch).unwrap();
        assert_eq!(patched.price, 0);
        assert_eq!(patched.quantity, Decimal::new(3, 0));
        assert_eq!(patched.updated_by.as_deref(), Some("editor"));

        let price = store
            .get_product_last_price(item.product_id)
            .unwrap()
            .unwrap();
        assert_eq!(price.price, 0);
        assert_eq!(price.recorded_by.as_deref(), Some("editor"));

        let touches = store.list_item_touches("item-1").unwrap();
        let editor_touch = touches.iter().find(|t| t.user_id == "editor").unwrap();
        assert_eq!(editor_touch.action, TouchAction::Price);

        let patch = ItemPatch {
            price: Some(200),
            purchased: Some(true),
            ..Default::default()
        };
        store.patch_item("list-1", "item-1", "editor", &patch).unwrap();

        let touches = store.list_item_touches("item-1").unwrap();
        assert_eq!(touches.len(), 2);
        let editor_touch = touches.iter().find(|t| t.user_id == "editor").unwrap();
        assert_eq!(editor_touch.action, TouchAction::Purchased);
    }

    #[test]
    fn test_patch_item_unit_only_does_not_touch() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_user(&store, "editor", "editor@example.com");
        create_list(&store, "list-1", "owner");
        let unit = store.get_or_create_unit("kg").unwrap();

        store
            .add_item(&new_item("item-1", "list-1", "rice", "owner", 0))
            .unwrap();

        let patch = ItemPatch {
            unit_id: Some(unit.id),
            ..Default::default()
        };
        let patched = store.patch_item("list-1", "item-1", "editor", &patch).unwrap();
        assert_eq!(patched.unit_id, Some(unit.id));

        let touches = store.list_item_touches("item-1").unwrap();
        assert!(touches.iter().all(|t| t.user_id != "editor"));
    }

    #[test]
    fn test_patch_item_wrong_list_not_found() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");
        create_list(&store, "list-2", "owner");

        store
            .add_item(&new_item("item-1", "list-1", "rice", "owner", 0))
            .unwrap();

        let patch = ItemPatch {
            purchased: Some(true),
            ..Default::default()
        };
        let result = store.patch_item("list-2", "item-1", "owner", &patch);
        assert!(matches!(result, Err(Error::NotFound)));
        assert!(!store.delete_item("list-2", "item-1").unwrap());
    }

    #[test]
    fn test_upsert_share_updates_role_and_guards_owner() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_user(&store, "guest", "guest@example.com");
        create_list(&store, "list-1", "owner");

        store
            .upsert_share(&share("list-1", "guest", Role::Reader))
            .unwrap();
        store
            .upsert_share(&share("list-1", "guest", Role::Editor))
            .unwrap();

        let stored = store.get_share("list-1", "guest").unwrap().unwrap();
        assert_eq!(stored.role, Role::Editor);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM list_shares"), 1);

        let result = store.upsert_share(&share("list-1", "owner", Role::Editor));
        assert!(matches!(result, Err(Error::OwnerShare)));

        let result = store.upsert_share(&share("list-1", "guest", Role::Owner));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_list_user_lists_includes_shared() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_user(&store, "guest", "guest@example.com");
        create_list(&store, "list-1", "owner");
        create_list(&store, "list-2", "guest");
        store
            .upsert_share(&share("list-1", "guest", Role::Reader))
            .unwrap();

        let lists = store.list_user_lists("guest").unwrap();
        assert_eq!(lists.len(), 2);
        let shared = lists.iter().find(|(l, _)| l.id == "list-1").unwrap();
        assert_eq!(shared.1, Role::Reader);
        let own = lists.iter().find(|(l, _)| l.id == "list-2").unwrap();
        assert_eq!(own.1, Role::Owner);
    }

    #[test]
    fn test_delete_list_cascades() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_user(&store, "guest", "guest@example.com");
        create_list(&store, "list-1", "owner");

        store
            .add_item(&new_item("item-1", "list-1", "bread", "owner", 100))
            .unwrap();
        store
            .upsert_share(&share("list-1", "guest", Role::Editor))
            .unwrap();
        store
            .create_share_link(&ShareLink {
                id: "link-1".to_string(),
                list_id: "list-1".to_string(),
                token: "e_token".to_string(),
                active: true,
                created_by: Some("owner".to_string()),
                created_at: Utc::now(),
            })
            .unwrap();

        assert!(store.delete_list("list-1").unwrap());

        assert_eq!(count(&store, "SELECT COUNT(*) FROM list_items"), 0);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM item_touches"), 0);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM list_shares"), 0);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM share_links"), 0);
        // Catalog entries and price memory are global and survive.
        assert_eq!(count(&store, "SELECT COUNT(*) FROM products"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM product_prices"), 1);
    }

    #[test]
    fn test_share_link_token_collision() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        let link = ShareLink {
            id: "link-1".to_string(),
            list_id: "list-1".to_string(),
            token: "e_same".to_string(),
            active: true,
            created_by: Some("owner".to_string()),
            created_at: Utc::now(),
        };
        store.create_share_link(&link).unwrap();

        let dup = ShareLink {
            id: "link-2".to_string(),
            ..link
        };
        assert!(matches!(
            store.create_share_link(&dup),
            Err(Error::TokenCollision)
        ));
    }

    #[test]
    fn test_deactivated_link_not_returned() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");

        store
            .create_share_link(&ShareLink {
                id: "link-1".to_string(),
                list_id: "list-1".to_string(),
                token: "l_abc".to_string(),
                active: true,
                created_by: Some("owner".to_string()),
                created_at: Utc::now(),
            })
            .unwrap();

        assert!(store.get_active_share_link("l_abc").unwrap().is_some());
        assert!(!store.deactivate_share_link("other-list", "link-1").unwrap());
        assert!(store.deactivate_share_link("list-1", "link-1").unwrap());
        assert!(store.get_active_share_link("l_abc").unwrap().is_none());
        assert_eq!(store.list_share_links("list-1").unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_oauth_user_creates_and_reuses() {
        let (_temp, store) = test_store();

        let profile = OAuthProfile {
            provider: "google".to_string(),
            subject: "sub-1".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            photo: Some("https://example.com/ana.png".to_string()),
        };

        let created = store.resolve_oauth_user(&profile).unwrap();
        assert_eq!(created.email, "ana@example.com");
        assert_eq!(created.name.as_deref(), Some("Ana"));
        assert!(created.password_hash.is_none());

        let renamed = OAuthProfile {
            name: Some("Someone Else".to_string()),
            ..profile.clone()
        };
        let again = store.resolve_oauth_user(&renamed).unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(again.name.as_deref(), Some("Ana"));
        assert!(store.get_oauth_link("google", "sub-1").unwrap().is_some());
    }

    #[test]
    fn test_resolve_oauth_user_links_existing_email_and_fills_gaps() {
        let (_temp, store) = test_store();
        let existing = create_user(&store, "user-1", "ana@example.com");

        let profile = OAuthProfile {
            provider: "google".to_string(),
            subject: "sub-9".to_string(),
            email: "ana@example.com".to_string(),
            name: Some("Ana".to_string()),
            photo: None,
        };

        let user = store.resolve_oauth_user(&profile).unwrap();
        assert_eq!(user.id, existing.id);
        assert_eq!(user.name.as_deref(), Some("Ana"));
        assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 1);
    }

    #[test]
    fn test_search_products_with_last_price_and_unit() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");
        let kg = store.get_or_create_unit("kg").unwrap();

        let mut item = new_item("item-1", "list-1", "tomato", "owner", 1500);
        item.unit_id = Some(kg.id);
        store.add_item(&item).unwrap();
        store.get_or_create_product("potato", None).unwrap();
        store.get_or_create_product("100% juice", None).unwrap();

        let hits = store.search_products("ato", 12).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "POTATO");
        assert_eq!(hits[0].last_price, 0);
        assert_eq!(hits[1].name, "TOMATO");
        assert_eq!(hits[1].last_price, 1500);
        assert_eq!(hits[1].last_unit.as_deref(), Some("kg"));

        let literal = store.search_products("0%", 12).unwrap();
        assert_eq!(literal.len(), 1);
        assert_eq!(literal[0].name, "100% JUICE");
    }

    #[test]
    fn test_search_units_case_insensitive() {
        let (_temp, store) = test_store();
        for unit in ["kg", "Liter", "unit"] {
            store.get_or_create_unit(unit).unwrap();
        }

        let hits = store.search_units("LIT", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "liter");
        assert_eq!(store.search_units("", 20).unwrap().len(), 3);
    }

    #[test]
    fn test_list_items_touch_labels_capped() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "owner@example.com");
        create_list(&store, "list-1", "owner");
        store
            .add_item(&new_item("item-1", "list-1", "eggs", "owner", 0))
            .unwrap();

        for i in 0..8 {
            let id = format!("user-{i}");
            create_user(&store, &id, &format!("user{i}@example.com"));
            store
                .upsert_share(&share("list-1", &id, Role::Editor))
                .unwrap();
            let patch = ItemPatch {
                purchased: Some(i % 2 == 0),
                ..Default::default()
            };
            store.patch_item("list-1", "item-1", &id, &patch).unwrap();
        }

        let items = store.list_items("list-1").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product, "EGGS");
        assert_eq!(items[0].touched_by.len(), 6);
        assert_eq!(store.list_item_touches("item-1").unwrap().len(), 9);
    }

    #[test]
    fn test_list_members_owner_first() {
        let (_temp, store) = test_store();
        create_user(&store, "owner", "zed@example.com");
        create_user(&store, "guest", "amy@example.com");
        create_list(&store, "list-1", "owner");
        store
            .upsert_share(&share("list-1", "guest", Role::Reader))
            .unwrap();

        let members = store.list_members("list-1").unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].role, Role::Owner);
        assert_eq!(members[1].role, Role::Reader);

        assert!(store.delete_share("list-1", "guest").unwrap());
        assert_eq!(store.list_members("list-1").unwrap().len(), 1);
    }
}
