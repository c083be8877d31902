use crate::{
    errors::MenuError,
    providers::db::storage::{CafeStore, CategoryStore, MenuItemStore},
    types::{Cafe, CafeDraft, Category, CategoryDraft, ItemDraft, ItemUpdate, MenuItem, Price},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{params, Connection, Database, Row, Value as TursoValue};
use uuid::Uuid;

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance, which manages a connection pool.
/// When cloned, it shares the same underlying database, allowing for concurrent
/// and shared access to the same database file or in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a
    ///   unique, isolated in-memory database. To share an in-memory database
    ///   across multiple `SqliteProvider` instances (e.g., in tests), create
    ///   one provider and then `.clone()` it.
    pub async fn new(db_path: &str) -> Result<Self, MenuError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| MenuError::StorageConnection(e.to_string()))?;

        // Enable WAL mode for better concurrency. This has no effect on
        // in-memory databases but is safe to run.
        let conn = db
            .connect()
            .map_err(|e| MenuError::StorageConnection(e.to_string()))?;
        // Use `query` for PRAGMA statements that return a value to avoid
        // "unexpected row" errors.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| MenuError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// A helper for tests to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), MenuError> {
        let conn = self.connect()?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Ensures that all required application tables and indexes exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), MenuError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    fn connect(&self) -> Result<Connection, MenuError> {
        self.db
            .connect()
            .map_err(|e| MenuError::StorageConnection(e.to_string()))
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

// --- Row decoding ---

fn column_text(row: &Row, idx: usize) -> Result<String, MenuError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(s),
        other => Err(MenuError::DataIntegrity(format!(
            "Expected text at column {idx}, found {other:?}"
        ))),
    }
}

fn column_text_or_null(row: &Row, idx: usize) -> Result<Option<String>, MenuError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(Some(s)),
        TursoValue::Null => Ok(None),
        other => Err(MenuError::DataIntegrity(format!(
            "Expected text or null at column {idx}, found {other:?}"
        ))),
    }
}

fn column_integer(row: &Row, idx: usize) -> Result<i64, MenuError> {
    match row.get_value(idx)? {
        TursoValue::Integer(i) => Ok(i),
        other => Err(MenuError::DataIntegrity(format!(
            "Expected integer at column {idx}, found {other:?}"
        ))),
    }
}

fn column_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, MenuError> {
    let raw = column_text(row, idx)?;
    chrono::NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        .map_err(|e| MenuError::DataIntegrity(format!("Failed to parse date '{raw}': {e}")))
}

fn cafe_from_row(row: &Row) -> Result<Cafe, MenuError> {
    Ok(Cafe {
        id: column_text(row, 0)?,
        owner_id: column_text(row, 1)?,
        name: column_text(row, 2)?,
        description: column_text_or_null(row, 3)?,
        location: column_text_or_null(row, 4)?,
        website: column_text_or_null(row, 5)?,
        email: column_text_or_null(row, 6)?,
        phone: column_text_or_null(row, 7)?,
        created_at: column_timestamp(row, 8)?,
    })
}

fn category_from_row(row: &Row) -> Result<Category, MenuError> {
    Ok(Category {
        id: column_text(row, 0)?,
        cafe_id: column_text(row, 1)?,
        name: column_text(row, 2)?,
        description: column_text_or_null(row, 3)?,
        sort_order: column_integer(row, 4)?,
        created_at: column_timestamp(row, 5)?,
    })
}

fn item_from_row(row: &Row) -> Result<MenuItem, MenuError> {
    let stored_price = column_text(row, 4)?;
    Ok(MenuItem {
        id: column_text(row, 0)?,
        category_id: column_text(row, 1)?,
        name: column_text(row, 2)?,
        description: column_text_or_null(row, 3)?,
        price: Price::from_stored(&stored_price)?,
        is_available: column_integer(row, 5)? != 0,
        sort_order: column_integer(row, 6)?,
        image_url: column_text_or_null(row, 7)?,
        created_at: column_timestamp(row, 8)?,
    })
}

// --- Ownership checks ---

/// Verifies that `cafe_id` exists and belongs to `owner_id`.
///
/// A missing cafe and a cafe owned by someone else are indistinguishable to
/// the caller: both fail with `NotAuthorized`.
async fn ensure_cafe_owned(
    conn: &Connection,
    cafe_id: &str,
    owner_id: &str,
) -> Result<(), MenuError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM cafes WHERE id = ? AND owner_id = ?",
            params![cafe_id, owner_id],
        )
        .await?;
    if rows.next().await?.is_none() {
        return Err(MenuError::NotAuthorized);
    }
    Ok(())
}

async fn fetch_category_owned(
    conn: &Connection,
    category_id: &str,
    owner_id: &str,
) -> Result<Category, MenuError> {
    let mut rows = conn
        .query(
            "SELECT mc.id, mc.cafe_id, mc.name, mc.description, mc.sort_order, mc.created_at
             FROM menu_categories mc
             JOIN cafes cf ON mc.cafe_id = cf.id
             WHERE mc.id = ? AND cf.owner_id = ?",
            params![category_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => category_from_row(&row),
        None => Err(MenuError::NotAuthorized),
    }
}

async fn fetch_item_owned(
    conn: &Connection,
    item_id: &str,
    owner_id: &str,
) -> Result<MenuItem, MenuError> {
    let mut rows = conn
        .query(
            "SELECT mi.id, mi.category_id, mi.name, mi.description, mi.price,
                    mi.is_available, mi.sort_order, mi.image_url, mi.created_at
             FROM menu_items mi
             JOIN menu_categories mc ON mi.category_id = mc.id
             JOIN cafes cf ON mc.cafe_id = cf.id
             WHERE mi.id = ? AND cf.owner_id = ?",
            params![item_id, owner_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => item_from_row(&row),
        None => Err(MenuError::NotAuthorized),
    }
}

#[async_trait]
impl CafeStore for SqliteProvider {
    async fn create_cafe(&self, owner_id: &str, draft: &CafeDraft) -> Result<Cafe, MenuError> {
        draft.validate()?;
        let conn = self.connect()?;

        let mut rows = conn
            .query("SELECT 1 FROM owners WHERE id = ?", params![owner_id])
            .await?;
        if rows.next().await?.is_none() {
            return Err(MenuError::NotAuthorized);
        }

        let cafe_id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO cafes (id, owner_id, name, description, location, website, email, phone)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                cafe_id.clone(),
                owner_id,
                draft.name.trim(),
                draft.description.clone(),
                draft.location.clone(),
                draft.website.clone(),
                draft.email.clone(),
                draft.phone.clone()
            ],
        )
        .await?;

        info!(cafe_id = %cafe_id, "Created cafe profile.");
        self.get_cafe(&cafe_id, owner_id).await
    }

    async fn list_cafes(&self, owner_id: &str) -> Result<Vec<Cafe>, MenuError> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {} FROM cafes WHERE owner_id = ? ORDER BY created_at DESC",
            sql::SELECT_CAFE_COLUMNS
        );
        let mut rows = conn.query(&sql, params![owner_id]).await?;

        let mut cafes = Vec::new();
        while let Some(row) = rows.next().await? {
            cafes.push(cafe_from_row(&row)?);
        }
        Ok(cafes)
    }

    async fn get_cafe(&self, cafe_id: &str, owner_id: &str) -> Result<Cafe, MenuError> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {} FROM cafes WHERE id = ? AND owner_id = ?",
            sql::SELECT_CAFE_COLUMNS
        );
        let mut rows = conn.query(&sql, params![cafe_id, owner_id]).await?;
        match rows.next().await? {
            Some(row) => cafe_from_row(&row),
            None => Err(MenuError::NotAuthorized),
        }
    }
}

#[async_trait]
impl CategoryStore for SqliteProvider {
    async fn list_categories(
        &self,
        cafe_id: &str,
        owner_id: &str,
    ) -> Result<Vec<Category>, MenuError> {
        let conn = self.connect()?;
        ensure_cafe_owned(&conn, cafe_id, owner_id).await?;

        let sql = format!(
            "SELECT {} FROM menu_categories WHERE cafe_id = ? ORDER BY sort_order",
            sql::SELECT_CATEGORY_COLUMNS
        );
        let mut rows = conn.query(&sql, params![cafe_id]).await?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(category_from_row(&row)?);
        }
        Ok(categories)
    }

    async fn get_category(
        &self,
        category_id: &str,
        owner_id: &str,
    ) -> Result<Category, MenuError> {
        let conn = self.connect()?;
        fetch_category_owned(&conn, category_id, owner_id).await
    }

    async fn create_category(
        &self,
        cafe_id: &str,
        owner_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Category, MenuError> {
        draft.validate()?;
        let conn = self.connect()?;
        ensure_cafe_owned(&conn, cafe_id, owner_id).await?;

        // Append-only ordering: the new ordinal is the current category
        // count for this cafe. Concurrent creators can collide on the same
        // ordinal; ordering is then implementation-defined.
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM menu_categories WHERE cafe_id = ?",
                params![cafe_id],
            )
            .await?;
        let sort_order = match rows.next().await? {
            Some(row) => column_integer(&row, 0)?,
            None => 0,
        };

        let category_id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO menu_categories (id, cafe_id, name, description, sort_order)
             VALUES (?, ?, ?, ?, ?)",
            params![
                category_id.clone(),
                cafe_id,
                draft.name.trim(),
                draft.description.clone(),
                sort_order
            ],
        )
        .await?;

        info!(category_id = %category_id, sort_order, "Created menu category.");
        fetch_category_owned(&conn, &category_id, owner_id).await
    }

    async fn delete_category(&self, category_id: &str, owner_id: &str) -> Result<(), MenuError> {
        let conn = self.connect()?;
        fetch_category_owned(&conn, category_id, owner_id).await?;

        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM menu_items WHERE category_id = ?",
                params![category_id],
            )
            .await?;
        let item_count = match rows.next().await? {
            Some(row) => column_integer(&row, 0)?,
            None => 0,
        };
        if item_count > 0 {
            return Err(MenuError::CategoryNotEmpty);
        }

        conn.execute(
            "DELETE FROM menu_categories WHERE id = ?",
            params![category_id],
        )
        .await?;
        info!(category_id = %category_id, "Deleted menu category.");
        Ok(())
    }
}

#[async_trait]
impl MenuItemStore for SqliteProvider {
    async fn list_items(
        &self,
        cafe_id: &str,
        owner_id: &str,
    ) -> Result<Vec<MenuItem>, MenuError> {
        let conn = self.connect()?;
        ensure_cafe_owned(&conn, cafe_id, owner_id).await?;

        let mut rows = conn
            .query(
                "SELECT mi.id, mi.category_id, mi.name, mi.description, mi.price,
                        mi.is_available, mi.sort_order, mi.image_url, mi.created_at
                 FROM menu_items mi
                 JOIN menu_categories mc ON mi.category_id = mc.id
                 WHERE mc.cafe_id = ?
                 ORDER BY mc.sort_order, mi.sort_order",
                params![cafe_id],
            )
            .await?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(item_from_row(&row)?);
        }
        Ok(items)
    }

    async fn get_item(&self, item_id: &str, owner_id: &str) -> Result<MenuItem, MenuError> {
        let conn = self.connect()?;
        fetch_item_owned(&conn, item_id, owner_id).await
    }

    async fn create_item(&self, owner_id: &str, draft: &ItemDraft) -> Result<MenuItem, MenuError> {
        let price = draft.validate()?;
        let conn = self.connect()?;
        fetch_category_owned(&conn, &draft.category_id, owner_id).await?;

        // Same append-only ordering as categories, scoped to this category.
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM menu_items WHERE category_id = ?",
                params![draft.category_id.clone()],
            )
            .await?;
        let sort_order = match rows.next().await? {
            Some(row) => column_integer(&row, 0)?,
            None => 0,
        };

        let item_id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO menu_items
                 (id, category_id, name, description, price, is_available, sort_order, image_url)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                item_id.clone(),
                draft.category_id.clone(),
                draft.name.trim(),
                draft.description.clone(),
                price.to_string(),
                i64::from(draft.is_available),
                sort_order,
                draft.image_url.clone()
            ],
        )
        .await?;

        info!(item_id = %item_id, sort_order, "Created menu item.");
        fetch_item_owned(&conn, &item_id, owner_id).await
    }

    async fn update_item(
        &self,
        item_id: &str,
        owner_id: &str,
        update: &ItemUpdate,
    ) -> Result<MenuItem, MenuError> {
        let parsed_price = update.validate()?;
        let conn = self.connect()?;
        let current = fetch_item_owned(&conn, item_id, owner_id).await?;

        // Moving to another category requires owning the target too. The
        // existing ordinal is kept, so the new category may show a
        // duplicated ordinal until a reorder feature exists.
        if let Some(category_id) = &update.category_id {
            fetch_category_owned(&conn, category_id, owner_id).await?;
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut query_params: Vec<TursoValue> = Vec::new();

        if let Some(name) = &update.name {
            assignments.push("name = ?".to_string());
            query_params.push(name.trim().to_string().into());
        }
        if let Some(description) = &update.description {
            assignments.push("description = ?".to_string());
            query_params.push(description.clone().into());
        }
        if let Some(price) = parsed_price {
            assignments.push("price = ?".to_string());
            query_params.push(price.to_string().into());
        }
        if let Some(category_id) = &update.category_id {
            assignments.push("category_id = ?".to_string());
            query_params.push(category_id.clone().into());
        }
        if let Some(is_available) = update.is_available {
            assignments.push("is_available = ?".to_string());
            query_params.push(TursoValue::Integer(i64::from(is_available)));
        }
        if let Some(image_url) = &update.image_url {
            assignments.push("image_url = ?".to_string());
            query_params.push(image_url.clone().into());
        }

        if assignments.is_empty() {
            return Ok(current);
        }

        let sql = format!(
            "UPDATE menu_items SET {} WHERE id = ?",
            assignments.join(", ")
        );
        query_params.push(item_id.to_string().into());

        debug!(sql = %sql, "Applying menu item update.");
        conn.execute(&sql, query_params).await?;

        fetch_item_owned(&conn, item_id, owner_id).await
    }

    async fn delete_item(&self, item_id: &str, owner_id: &str) -> Result<(), MenuError> {
        let conn = self.connect()?;
        fetch_item_owned(&conn, item_id, owner_id).await?;

        conn.execute("DELETE FROM menu_items WHERE id = ?", params![item_id])
            .await?;
        info!(item_id = %item_id, "Deleted menu item row.");
        Ok(())
    }
}
