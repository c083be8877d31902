//! # Image Lifecycle Manager
//!
//! Keeps `MenuItem.image_url` consistent with the object store across
//! create, replace, and delete. The two stores have no shared transaction,
//! so every flow here is sequential with an explicit compensating action:
//! a failed row write deletes the just-uploaded asset, and a failed asset
//! delete never blocks the row operation; it is reported as an orphan
//! warning instead.

use crate::{
    errors::MenuError,
    providers::db::{
        sqlite::SqliteProvider,
        storage::{CategoryStore, MenuItemStore},
    },
    providers::object::ObjectStore,
    types::{ItemDraft, ItemUpdate, MenuItem},
};
use tracing::{info, warn};
use uuid::Uuid;

/// Raw image bytes plus the original file extension.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// The outcome of an item mutation that may have touched the object store.
#[derive(Debug)]
pub struct ItemMutation {
    pub item: MenuItem,
    /// Set when an asset could not be deleted or replaced cleanly; the
    /// record mutation still completed.
    pub orphan_warning: Option<String>,
}

/// The outcome of an item deletion.
#[derive(Debug)]
pub struct ItemDeletion {
    /// Set when the associated asset could not be removed; the row is gone
    /// regardless.
    pub orphan_warning: Option<String>,
}

/// Computes a fresh storage path for an image, namespaced by cafe id and
/// made unique with a random token.
fn asset_path_for(cafe_id: &str, extension: &str) -> String {
    let token = Uuid::new_v4();
    let ext = extension.trim_start_matches('.');
    format!("{cafe_id}/{token}.{ext}")
}

/// Derives the storage path back out of a stored public URL.
///
/// The path is the suffix following the bucket marker segment. A URL
/// without the marker was not written by this system, so no deletion is
/// attempted for it.
pub fn derive_asset_path<'a>(url: &'a str, bucket: &str) -> Option<&'a str> {
    let marker = format!("/{bucket}/");
    url.split_once(marker.as_str())
        .map(|(_, suffix)| suffix)
        .filter(|suffix| !suffix.is_empty())
}

/// Best-effort removal of a single asset. Returns a warning instead of an
/// error so record operations can proceed.
async fn remove_asset_best_effort(store: &dyn ObjectStore, path: &str) -> Option<String> {
    match store.remove(&[path.to_string()]).await {
        Ok(()) => None,
        Err(e) => {
            let warning = format!("Failed to remove asset at '{path}': {e}");
            warn!("{warning}");
            Some(warning)
        }
    }
}

/// Creates a menu item, uploading its image first when a payload is given.
///
/// If the row insert fails after the upload succeeded, the just-written
/// asset is deleted again so no orphan is left behind.
pub async fn create_item_with_image(
    db: &SqliteProvider,
    store: &dyn ObjectStore,
    owner_id: &str,
    draft: &ItemDraft,
    payload: Option<ImagePayload>,
) -> Result<MenuItem, MenuError> {
    let category = db.get_category(&draft.category_id, owner_id).await?;

    let mut draft = draft.clone();
    let mut uploaded_path = None;

    if let Some(payload) = payload {
        let path = asset_path_for(&category.cafe_id, &payload.extension);
        store.upload(&path, payload.bytes).await?;
        draft.image_url = Some(store.public_url(&path));
        uploaded_path = Some(path);
    }

    match db.create_item(owner_id, &draft).await {
        Ok(item) => Ok(item),
        Err(e) => {
            if let Some(path) = uploaded_path {
                if let Some(warning) = remove_asset_best_effort(store, &path).await {
                    warn!("Compensation after failed item create left an orphan: {warning}");
                }
            }
            Err(e)
        }
    }
}

/// Applies an item update, replacing its image when a new payload is given.
///
/// The old asset is deleted at its derived path first, then the new payload
/// is uploaded under a fresh path, then the row is updated with the new
/// URL. Without a payload the stored `image_url` is preserved unchanged.
pub async fn update_item_with_image(
    db: &SqliteProvider,
    store: &dyn ObjectStore,
    owner_id: &str,
    item_id: &str,
    update: &ItemUpdate,
    payload: Option<ImagePayload>,
) -> Result<ItemMutation, MenuError> {
    update.validate()?;
    let current = db.get_item(item_id, owner_id).await?;

    let mut update = update.clone();
    let mut orphan_warning = None;

    if let Some(payload) = payload {
        if let Some(old_url) = &current.image_url {
            if let Some(old_path) = derive_asset_path(old_url, store.bucket()) {
                orphan_warning = remove_asset_best_effort(store, old_path).await;
            }
        }

        let category = db.get_category(&current.category_id, owner_id).await?;
        let path = asset_path_for(&category.cafe_id, &payload.extension);
        match store.upload(&path, payload.bytes).await {
            Ok(_) => {
                update.image_url = Some(store.public_url(&path));
            }
            Err(e) => {
                // The record update still goes through; the item keeps its
                // previous URL, which may now point at a deleted asset.
                let warning = format!("Failed to upload replacement image: {e}");
                warn!("{warning}");
                orphan_warning = Some(warning);
                update.image_url = None;
            }
        }
    }

    let item = db.update_item(item_id, owner_id, &update).await?;
    Ok(ItemMutation {
        item,
        orphan_warning,
    })
}

/// Deletes a menu item and its associated asset.
///
/// The asset delete is attempted first and is best-effort: its failure is
/// reported but never blocks the row deletion.
pub async fn delete_item_and_image(
    db: &SqliteProvider,
    store: &dyn ObjectStore,
    owner_id: &str,
    item_id: &str,
) -> Result<ItemDeletion, MenuError> {
    let item = db.get_item(item_id, owner_id).await?;

    let mut orphan_warning = None;
    if let Some(url) = &item.image_url {
        match derive_asset_path(url, store.bucket()) {
            Some(path) => {
                orphan_warning = remove_asset_best_effort(store, path).await;
            }
            None => {
                info!(url = %url, "Image URL has no bucket marker, leaving asset alone.");
            }
        }
    }

    db.delete_item(item_id, owner_id).await?;
    Ok(ItemDeletion { orphan_warning })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_asset_path_extracts_bucket_suffix() {
        let url = "https://objects.example.com/object/public/menu-images/cafe-1/abc.png";
        assert_eq!(
            derive_asset_path(url, "menu-images"),
            Some("cafe-1/abc.png")
        );
    }

    #[test]
    fn derive_asset_path_without_marker_is_none() {
        let url = "https://cdn.example.com/some/external/image.png";
        assert_eq!(derive_asset_path(url, "menu-images"), None);
    }

    #[test]
    fn derive_asset_path_with_empty_suffix_is_none() {
        let url = "https://objects.example.com/object/public/menu-images/";
        assert_eq!(derive_asset_path(url, "menu-images"), None);
    }

    #[test]
    fn asset_paths_are_scoped_by_cafe_and_unique() {
        let first = asset_path_for("cafe-1", "png");
        let second = asset_path_for("cafe-1", ".png");
        assert!(first.starts_with("cafe-1/"));
        assert!(first.ends_with(".png"));
        assert!(second.ends_with(".png"));
        assert!(!second.contains(".."));
        assert_ne!(first, second);
    }
}
