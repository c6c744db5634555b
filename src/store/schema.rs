pub const SCHEMA: &str = r#"
-- Users authenticate with a password, an OAuth identity, or both
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,   -- trimmed, lower-cased
    name TEXT,
    photo TEXT,
    password_hash TEXT,           -- NULL for OAuth-only accounts
    created_at TEXT DEFAULT (datetime('now'))
);

-- External identities linked to users
CREATE TABLE IF NOT EXISTS oauth_links (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    provider TEXT NOT NULL,
    subject TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),

    UNIQUE(provider, subject),
    UNIQUE(user_id, provider)
);

-- Shopping lists; the owner never changes
CREATE TABLE IF NOT EXISTS lists (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    photo TEXT,
    owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Roles granted to non-owners
CREATE TABLE IF NOT EXISTS list_shares (
    list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role TEXT NOT NULL CHECK (role IN ('editor', 'reader')),
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (list_id, user_id)
);

-- Invite links; the token prefix carries the granted role
CREATE TABLE IF NOT EXISTS share_links (
    id TEXT PRIMARY KEY,
    list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    token TEXT NOT NULL UNIQUE,
    active INTEGER NOT NULL DEFAULT 1,
    created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Global product catalog, unique by normalized name
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Unit reference catalog
CREATE TABLE IF NOT EXISTS units (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Most recent price per product, overwritten in place
CREATE TABLE IF NOT EXISTS product_prices (
    product_id INTEGER PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
    price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
    recorded_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Line items; a product appears at most once per list
CREATE TABLE IF NOT EXISTS list_items (
    id TEXT PRIMARY KEY,
    list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    unit_id INTEGER REFERENCES units(id) ON DELETE SET NULL,
    quantity TEXT NOT NULL DEFAULT '1',   -- exact decimal, canonical text
    price INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
    purchased INTEGER NOT NULL DEFAULT 0,
    created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    updated_by TEXT REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now')),

    UNIQUE(list_id, product_id)
);

-- Last action per (item, user), for "touched by" indicators
CREATE TABLE IF NOT EXISTS item_touches (
    item_id TEXT NOT NULL REFERENCES list_items(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    action TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (item_id, user_id)
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_oauth_links_user ON oauth_links(user_id);
CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(owner_id);
CREATE INDEX IF NOT EXISTS idx_list_shares_user ON list_shares(user_id);
CREATE INDEX IF NOT EXISTS idx_share_links_list ON share_links(list_id);
CREATE INDEX IF NOT EXISTS idx_list_items_list ON list_items(list_id);
CREATE INDEX IF NOT EXISTS idx_list_items_product ON list_items(product_id);
CREATE INDEX IF NOT EXISTS idx_item_touches_item ON item_touches(item_id);
"#;
