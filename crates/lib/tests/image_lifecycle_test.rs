//! # Image Lifecycle Tests
//!
//! Exercises the coupling between menu item rows and their image assets:
//! create-with-image, replace-on-update, delete-on-removal, and the
//! best-effort/compensating paths when one of the two stores fails.

mod common;

use common::setup_menu;
use qrmenu::images::{
    self, create_item_with_image, delete_item_and_image, update_item_with_image, ImagePayload,
};
use qrmenu::providers::db::storage::{CategoryStore, MenuItemStore};
use qrmenu::providers::object::ObjectStore;
use qrmenu::types::{CategoryDraft, ItemDraft, ItemUpdate};
use qrmenu::MenuError;
use qrmenu_test_utils::MockObjectStore;

fn png_payload() -> ImagePayload {
    ImagePayload {
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
        extension: "png".to_string(),
    }
}

fn item_draft(name: &str, price: &str, category_id: &str) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        price: price.to_string(),
        category_id: category_id.to_string(),
        ..Default::default()
    }
}

async fn setup_category() -> (
    qrmenu_test_utils::TestSetup,
    MockObjectStore,
    String,
    String,
    String,
) {
    let (setup, owner_id, cafe_id) = setup_menu().await.unwrap();
    let category = setup
        .provider
        .create_category(
            &cafe_id,
            &owner_id,
            &CategoryDraft {
                name: "Drinks".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    let store = MockObjectStore::new();
    (setup, store, owner_id, cafe_id, category.id)
}

#[tokio::test]
async fn test_create_with_image_uploads_and_links_the_asset() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, cafe_id, category_id) = setup_category().await;

    // --- 2. Act ---
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();

    // --- 3. Assert: exactly one asset, reachable from the stored URL.
    assert_eq!(store.asset_count(), 1);
    let url = item.image_url.expect("item should carry an image URL");
    let path = images::derive_asset_path(&url, store.bucket()).unwrap();
    assert!(store.contains(path));
    assert!(path.starts_with(&format!("{cafe_id}/")));
    assert!(path.ends_with(".png"));
}

#[tokio::test]
async fn test_create_without_payload_touches_no_assets() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;

    // --- 2. Act ---
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        None,
    )
    .await
    .unwrap();

    // --- 3. Assert ---
    assert!(item.image_url.is_none());
    assert_eq!(store.asset_count(), 0);
}

#[tokio::test]
async fn test_failed_row_write_compensates_the_upload() {
    // --- 1. Arrange: a draft that passes category resolution but fails
    // repository validation, so the upload has already happened.
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let draft = item_draft("", "4.5", &category_id);

    // --- 2. Act ---
    let result = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &draft,
        Some(png_payload()),
    )
    .await;

    // --- 3. Assert: the just-written asset was deleted again.
    assert!(matches!(result, Err(MenuError::Validation(_))));
    assert_eq!(store.asset_count(), 0);
    assert_eq!(store.removal_log().len(), 1);
}

#[tokio::test]
async fn test_replace_leaves_exactly_one_reachable_asset() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();
    let old_url = item.image_url.clone().unwrap();
    let old_path = images::derive_asset_path(&old_url, store.bucket())
        .unwrap()
        .to_string();

    // --- 2. Act: upload a replacement image.
    let mutation = update_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item.id,
        &ItemUpdate::default(),
        Some(ImagePayload {
            bytes: vec![1, 2, 3],
            extension: "jpg".to_string(),
        }),
    )
    .await
    .unwrap();

    // --- 3. Assert: prior path gone, one asset reachable from the new URL.
    assert!(mutation.orphan_warning.is_none());
    assert!(!store.contains(&old_path));
    assert_eq!(store.asset_count(), 1);
    let new_url = mutation.item.image_url.unwrap();
    assert_ne!(new_url, old_url);
    let new_path = images::derive_asset_path(&new_url, store.bucket()).unwrap();
    assert!(store.contains(new_path));
}

#[tokio::test]
async fn test_update_without_payload_preserves_the_image() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();
    let url = item.image_url.clone().unwrap();

    // --- 2. Act: a plain field edit, no new payload.
    let mutation = update_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item.id,
        &ItemUpdate {
            name: Some("Oat Latte".to_string()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    // --- 3. Assert ---
    assert_eq!(mutation.item.name, "Oat Latte");
    assert_eq!(mutation.item.image_url.as_deref(), Some(url.as_str()));
    assert_eq!(store.asset_count(), 1);
}

#[tokio::test]
async fn test_failed_replacement_upload_reports_but_updates_the_row() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();
    store.fail_uploads(true);

    // --- 2. Act ---
    let mutation = update_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item.id,
        &ItemUpdate {
            name: Some("Oat Latte".to_string()),
            ..Default::default()
        },
        Some(png_payload()),
    )
    .await
    .unwrap();

    // --- 3. Assert: the record mutation completed, the asset trouble is a
    // warning, and the item still points at its previous (now deleted) URL.
    assert_eq!(mutation.item.name, "Oat Latte");
    assert!(mutation.orphan_warning.is_some());
    assert_eq!(mutation.item.image_url, item.image_url);
    assert_eq!(store.asset_count(), 0);
}

#[tokio::test]
async fn test_delete_item_removes_the_derived_asset() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, cafe_id, category_id) = setup_category().await;
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();
    let path = images::derive_asset_path(item.image_url.as_ref().unwrap(), store.bucket())
        .unwrap()
        .to_string();

    // --- 2. Act ---
    let deletion = delete_item_and_image(&setup.provider, &store, &owner_id, &item.id)
        .await
        .unwrap();

    // --- 3. Assert: zero assets remain at the derived path, row gone.
    assert!(deletion.orphan_warning.is_none());
    assert!(!store.contains(&path));
    assert_eq!(store.asset_count(), 0);
    assert!(matches!(
        setup.provider.get_item(&item.id, &owner_id).await,
        Err(MenuError::NotAuthorized)
    ));
    let items = setup.provider.list_items(&cafe_id, &owner_id).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_asset_failure_never_blocks_item_deletion() {
    // --- 1. Arrange ---
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let item = create_item_with_image(
        &setup.provider,
        &store,
        &owner_id,
        &item_draft("Latte", "4.5", &category_id),
        Some(png_payload()),
    )
    .await
    .unwrap();
    store.fail_removals(true);

    // --- 2. Act ---
    let deletion = delete_item_and_image(&setup.provider, &store, &owner_id, &item.id)
        .await
        .unwrap();

    // --- 3. Assert: the row is gone, the orphaned asset is reported.
    assert!(deletion.orphan_warning.is_some());
    assert!(matches!(
        setup.provider.get_item(&item.id, &owner_id).await,
        Err(MenuError::NotAuthorized)
    ));
    assert_eq!(store.asset_count(), 1);
}

#[tokio::test]
async fn test_foreign_image_urls_are_left_alone() {
    // --- 1. Arrange: an item whose URL has no bucket marker.
    let (setup, store, owner_id, _cafe_id, category_id) = setup_category().await;
    let mut draft = item_draft("Latte", "4.5", &category_id);
    draft.image_url = Some("https://cdn.example.com/external.png".to_string());
    let item = setup.provider.create_item(&owner_id, &draft).await.unwrap();

    // --- 2. Act ---
    let deletion = delete_item_and_image(&setup.provider, &store, &owner_id, &item.id)
        .await
        .unwrap();

    // --- 3. Assert: no removal was even attempted.
    assert!(deletion.orphan_warning.is_none());
    assert!(store.removal_log().is_empty());
}
