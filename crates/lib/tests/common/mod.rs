#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the integration tests: tracing, an isolated in-memory
//! database, and a ready-made owner + cafe pair.

use anyhow::Result;
use core_access::get_or_create_owner;
use dotenvy::dotenv;
use qrmenu::providers::db::storage::CafeStore;
use qrmenu::types::CafeDraft;
use qrmenu_test_utils::TestSetup;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

/// Creates an isolated database with one owner and one cafe.
///
/// Returns the setup plus the owner id and cafe id most tests operate on.
pub async fn setup_menu() -> Result<(TestSetup, String, String)> {
    setup_tracing();
    let setup = TestSetup::new().await?;

    let owner = get_or_create_owner(&setup.db, "owner@example.com").await?;
    let cafe = setup
        .provider
        .create_cafe(
            &owner.id,
            &CafeDraft {
                name: "Corner Brew".to_string(),
                description: Some("Espresso and pastries".to_string()),
                location: Some("12 Canal St".to_string()),
                ..Default::default()
            },
        )
        .await?;

    Ok((setup, owner.id, cafe.id))
}
