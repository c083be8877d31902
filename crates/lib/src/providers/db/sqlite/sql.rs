//! # SQLite Specific SQL Queries
//!
//! This module centralizes the schema and query strings for the SQLite
//! provider. This keeps the repository logic cleaner and isolates
//! database-specific syntax.

/// Creates the `owners` table, managed by the `core-access` crate.
pub const CREATE_OWNERS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS owners (
        id TEXT PRIMARY KEY,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );";

/// Creates the `cafes` table.
pub const CREATE_CAFES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS cafes (
        id TEXT PRIMARY KEY,
        owner_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        location TEXT,
        website TEXT,
        email TEXT,
        phone TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );";

/// Creates the `menu_categories` table. `sort_order` is dense from 0 within
/// each cafe and assigned at creation time.
pub const CREATE_MENU_CATEGORIES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS menu_categories (
        id TEXT PRIMARY KEY,
        cafe_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );";

/// Creates the `menu_items` table. Prices are stored as canonical decimal
/// text; `image_url` is a plain URL string into the object store.
pub const CREATE_MENU_ITEMS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS menu_items (
        id TEXT PRIMARY KEY,
        category_id TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        price TEXT NOT NULL,
        is_available INTEGER NOT NULL DEFAULT 1,
        sort_order INTEGER NOT NULL DEFAULT 0,
        image_url TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );";

pub const CREATE_CAFES_OWNER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_cafes_owner_id ON cafes (owner_id);";

pub const CREATE_CATEGORIES_CAFE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_menu_categories_cafe_id ON menu_categories (cafe_id);";

pub const CREATE_ITEMS_CATEGORY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_menu_items_category_id ON menu_items (category_id);";

/// All statements needed to bootstrap a fresh database, in dependency order.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[
    CREATE_OWNERS_TABLE,
    CREATE_CAFES_TABLE,
    CREATE_MENU_CATEGORIES_TABLE,
    CREATE_MENU_ITEMS_TABLE,
    CREATE_CAFES_OWNER_INDEX,
    CREATE_CATEGORIES_CAFE_INDEX,
    CREATE_ITEMS_CATEGORY_INDEX,
];

/// Columns selected for every cafe read, in `Cafe` field order.
pub const SELECT_CAFE_COLUMNS: &str =
    "id, owner_id, name, description, location, website, email, phone, created_at";

/// Columns selected for every category read, in `Category` field order.
pub const SELECT_CATEGORY_COLUMNS: &str =
    "id, cafe_id, name, description, sort_order, created_at";

/// Columns selected for every item read, in `MenuItem` field order.
pub const SELECT_ITEM_COLUMNS: &str =
    "id, category_id, name, description, price, is_available, sort_order, image_url, created_at";
