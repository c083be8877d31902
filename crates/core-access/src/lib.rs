//! # Core Access Crate
//!
//! This crate is the central authority for owner identity in the QR Menu
//! application. Every mutation of a cafe's menu is performed on behalf of an
//! owner resolved here; callers with no resolvable owner must treat the
//! operation as unauthorized.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use turso::{Database, Error as TursoError, Row, params};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoreAccessError {
    #[error("Database error: {0}")]
    Database(#[from] TursoError),
    #[error("Failed to create or find owner for identifier: {0}")]
    OwnerPersistenceFailed(String),
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
}

/// An authenticated cafe owner.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Owner {
    /// The unique, deterministic ID of the owner (UUIDv5 from an external identifier).
    pub id: String,
    /// The timestamp when the owner was first seen.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Owner {
    type Error = CoreAccessError;

    fn try_from(row: &Row) -> std::result::Result<Self, Self::Error> {
        let created_at_str: String = row.get(1)?;
        let created_at =
            chrono::NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
                .map_err(|e| {
                    CoreAccessError::DataIntegrity(format!(
                        "Failed to parse date '{created_at_str}': {e}"
                    ))
                })?;

        Ok(Owner {
            id: row.get(0)?,
            created_at,
        })
    }
}

/// Computes the deterministic owner id for an external identifier.
///
/// The id is a UUIDv5 of the identifier, so the same email or token subject
/// always maps to the same owner row.
pub fn owner_id_for(identifier: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, identifier.as_bytes()).to_string()
}

/// Finds an owner by their unique identifier (e.g., email or token sub),
/// creating them if they don't exist.
pub async fn get_or_create_owner(
    db: &Database,
    owner_identifier: &str,
) -> Result<Owner, CoreAccessError> {
    let conn = db.connect()?;
    let owner_id = owner_id_for(owner_identifier);

    // 1. Try to SELECT the owner first for maximum compatibility.
    let mut rows = conn
        .query(
            "SELECT id, created_at FROM owners WHERE id = ?",
            params![owner_id.clone()],
        )
        .await?;

    if let Some(row) = rows.next().await? {
        // Owner exists, parse and return it.
        return Owner::try_from(&row);
    }

    debug!(identifier = %owner_identifier, "Owner not found, creating a new row.");
    conn.execute("INSERT INTO owners (id) VALUES (?)", params![owner_id.clone()])
        .await?;

    // 2. SELECT the newly created owner to get all fields (like created_at).
    let mut rows = conn
        .query(
            "SELECT id, created_at FROM owners WHERE id = ?",
            params![owner_id],
        )
        .await?;

    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreAccessError::OwnerPersistenceFailed(owner_identifier.to_string()))?;

    Owner::try_from(&row)
}
