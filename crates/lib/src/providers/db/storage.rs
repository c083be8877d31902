use crate::errors::MenuError;
use crate::types::{Cafe, CafeDraft, Category, CategoryDraft, ItemDraft, ItemUpdate, MenuItem};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// Repository contract for cafe profiles.
///
/// Every operation is scoped to the acting owner; an id that does not
/// resolve to a row owned by that owner fails with `NotAuthorized`.
#[async_trait]
pub trait CafeStore: Send + Sync + DynClone + Debug {
    /// Creates a cafe for the owner. The owner reference is immutable.
    async fn create_cafe(&self, owner_id: &str, draft: &CafeDraft) -> Result<Cafe, MenuError>;

    /// Lists the owner's cafes, newest first.
    async fn list_cafes(&self, owner_id: &str) -> Result<Vec<Cafe>, MenuError>;

    /// Fetches a single cafe, checking ownership.
    async fn get_cafe(&self, cafe_id: &str, owner_id: &str) -> Result<Cafe, MenuError>;
}

/// Repository contract for menu categories.
#[async_trait]
pub trait CategoryStore: Send + Sync + DynClone + Debug {
    /// Lists a cafe's categories ascending by `sort_order`.
    async fn list_categories(
        &self,
        cafe_id: &str,
        owner_id: &str,
    ) -> Result<Vec<Category>, MenuError>;

    /// Fetches a single category, checking ownership through its cafe.
    async fn get_category(
        &self,
        category_id: &str,
        owner_id: &str,
    ) -> Result<Category, MenuError>;

    /// Creates a category with `sort_order` equal to the cafe's current
    /// category count (append-only ordering).
    async fn create_category(
        &self,
        cafe_id: &str,
        owner_id: &str,
        draft: &CategoryDraft,
    ) -> Result<Category, MenuError>;

    /// Deletes an empty category. Fails with `CategoryNotEmpty` while any
    /// menu item still references it.
    async fn delete_category(&self, category_id: &str, owner_id: &str) -> Result<(), MenuError>;
}

/// Repository contract for menu items.
///
/// The repository performs no asset cleanup; callers that manage images go
/// through the lifecycle flows in [`crate::images`].
#[async_trait]
pub trait MenuItemStore: Send + Sync + DynClone + Debug {
    /// Lists all items across a cafe's categories, ordered by category
    /// `sort_order` and then item `sort_order`.
    async fn list_items(&self, cafe_id: &str, owner_id: &str)
        -> Result<Vec<MenuItem>, MenuError>;

    /// Fetches a single item, checking ownership through its category's cafe.
    async fn get_item(&self, item_id: &str, owner_id: &str) -> Result<MenuItem, MenuError>;

    /// Creates an item with `sort_order` equal to the current item count in
    /// its category.
    async fn create_item(&self, owner_id: &str, draft: &ItemDraft) -> Result<MenuItem, MenuError>;

    /// Applies a partial update. Moving the item to another category keeps
    /// its existing `sort_order`.
    async fn update_item(
        &self,
        item_id: &str,
        owner_id: &str,
        update: &ItemUpdate,
    ) -> Result<MenuItem, MenuError>;

    /// Removes the row only.
    async fn delete_item(&self, item_id: &str, owner_id: &str) -> Result<(), MenuError>;
}

dyn_clone::clone_trait_object!(CafeStore);
dyn_clone::clone_trait_object!(CategoryStore);
dyn_clone::clone_trait_object!(MenuItemStore);
