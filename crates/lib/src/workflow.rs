//! # Workflow Controller
//!
//! Sequences the menu management operations and owns the per-form state
//! machine: `Idle → editing → Submitting → (Idle on success | editing on
//! failure)`. Exactly one form can be open at a time; opening another
//! resets the previous one. Required fields are validated locally before
//! any store call, and every successful mutation is followed by a full
//! re-fetch of the affected lists: the next read is the source of truth,
//! there is no optimistic merge.

use crate::{
    errors::MenuError,
    images::{self, ImagePayload, ItemDeletion, ItemMutation},
    providers::db::{
        sqlite::SqliteProvider,
        storage::{CafeStore, CategoryStore, MenuItemStore},
    },
    providers::object::ObjectStore,
    types::{Category, CategoryDraft, ItemDraft, ItemUpdate, MenuItem},
    view::{build_menu_view, CategoryView},
};
use tracing::debug;

/// The single open form, if any. Field buffers live inside the variant so
/// a failed submit can hand them back untouched.
#[derive(Debug, Clone)]
pub enum FormState {
    Idle,
    CreatingCategory(CategoryDraft),
    CreatingItem(ItemDraft),
    EditingItem { item_id: String, draft: ItemDraft },
    Submitting,
}

impl FormState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Drives menu management for one cafe on behalf of one owner.
///
/// Submission is single-flight: the exclusive borrow taken by each submit
/// call means no second submit can start until the first reaches a
/// terminal outcome.
pub struct MenuWorkflow {
    db: SqliteProvider,
    objects: Box<dyn ObjectStore>,
    owner_id: String,
    cafe_id: String,
    categories: Vec<Category>,
    items: Vec<MenuItem>,
    form: FormState,
}

impl MenuWorkflow {
    /// Opens a workflow for `cafe_id`, verifying ownership and loading the
    /// initial category and item lists.
    ///
    /// The owner comes in as the identity provider returned it; an absent
    /// owner is an authorization failure before anything is fetched.
    pub async fn new(
        db: SqliteProvider,
        objects: Box<dyn ObjectStore>,
        owner_id: Option<&str>,
        cafe_id: &str,
    ) -> Result<Self, MenuError> {
        let owner_id = owner_id.ok_or(MenuError::NotAuthorized)?;
        db.get_cafe(cafe_id, owner_id).await?;
        let mut workflow = Self {
            db,
            objects,
            owner_id: owner_id.to_string(),
            cafe_id: cafe_id.to_string(),
            categories: Vec::new(),
            items: Vec::new(),
            form: FormState::Idle,
        };
        workflow.refresh().await?;
        Ok(workflow)
    }

    /// Re-fetches both lists from the repository.
    pub async fn refresh(&mut self) -> Result<(), MenuError> {
        self.categories = self
            .db
            .list_categories(&self.cafe_id, &self.owner_id)
            .await?;
        self.items = self.db.list_items(&self.cafe_id, &self.owner_id).await?;
        Ok(())
    }

    /// The aggregate menu tree built from the last fetched lists.
    pub fn menu(&self) -> Vec<CategoryView> {
        build_menu_view(&self.categories, &self.items)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Opens the category create form, discarding any open form.
    pub fn begin_category(&mut self) {
        self.form = FormState::CreatingCategory(CategoryDraft::default());
    }

    /// Opens the item create form, discarding any open form.
    pub fn begin_item(&mut self) {
        self.form = FormState::CreatingItem(ItemDraft::default());
    }

    /// Opens the edit form for an existing item, discarding any open form.
    /// The buffers are loaded from the stored record.
    pub async fn begin_edit_item(&mut self, item_id: &str) -> Result<(), MenuError> {
        let item = self.db.get_item(item_id, &self.owner_id).await?;
        self.form = FormState::EditingItem {
            item_id: item.id.clone(),
            draft: ItemDraft {
                name: item.name,
                description: item.description,
                price: item.price.to_string(),
                category_id: item.category_id,
                is_available: item.is_available,
                image_url: item.image_url,
            },
        };
        Ok(())
    }

    /// Closes the open form without submitting.
    pub fn cancel(&mut self) {
        self.form = FormState::Idle;
    }

    /// Mutable access to the open category form's field buffers.
    pub fn category_draft_mut(&mut self) -> Option<&mut CategoryDraft> {
        match &mut self.form {
            FormState::CreatingCategory(draft) => Some(draft),
            _ => None,
        }
    }

    /// Mutable access to the open item form's field buffers.
    pub fn item_draft_mut(&mut self) -> Option<&mut ItemDraft> {
        match &mut self.form {
            FormState::CreatingItem(draft) => Some(draft),
            FormState::EditingItem { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Submits the open category form.
    ///
    /// Validation failures and store failures both hand the form back in
    /// its editing state with the entered values preserved.
    pub async fn submit_category(&mut self) -> Result<Category, MenuError> {
        let draft = match std::mem::replace(&mut self.form, FormState::Submitting) {
            FormState::CreatingCategory(draft) => draft,
            other => {
                self.form = other;
                return Err(MenuError::Validation(
                    "No category form is open".to_string(),
                ));
            }
        };

        if let Err(e) = draft.validate() {
            self.form = FormState::CreatingCategory(draft);
            return Err(e);
        }

        match self
            .db
            .create_category(&self.cafe_id, &self.owner_id, &draft)
            .await
        {
            Ok(category) => {
                debug!(category_id = %category.id, "Category form submitted.");
                self.form = FormState::Idle;
                self.refresh().await?;
                Ok(category)
            }
            Err(e) => {
                self.form = FormState::CreatingCategory(draft);
                Err(e)
            }
        }
    }

    /// Submits the open item form, creating or updating depending on how
    /// the form was opened. An optional image payload goes through the
    /// image lifecycle flows.
    pub async fn submit_item(
        &mut self,
        payload: Option<ImagePayload>,
    ) -> Result<ItemMutation, MenuError> {
        let state = std::mem::replace(&mut self.form, FormState::Submitting);
        let (item_id, draft) = match state {
            FormState::CreatingItem(draft) => (None, draft),
            FormState::EditingItem { item_id, draft } => (Some(item_id), draft),
            other => {
                self.form = other;
                return Err(MenuError::Validation("No item form is open".to_string()));
            }
        };

        // Fail fast on bad input: no store round-trip for an empty name or
        // a non-numeric price.
        if let Err(e) = draft.validate() {
            self.form = Self::restore_item_form(item_id, draft);
            return Err(e);
        }

        let result = match &item_id {
            None => images::create_item_with_image(
                &self.db,
                self.objects.as_ref(),
                &self.owner_id,
                &draft,
                payload,
            )
            .await
            .map(|item| ItemMutation {
                item,
                orphan_warning: None,
            }),
            Some(id) => {
                let update = ItemUpdate {
                    name: Some(draft.name.clone()),
                    description: draft.description.clone(),
                    price: Some(draft.price.clone()),
                    category_id: Some(draft.category_id.clone()),
                    is_available: Some(draft.is_available),
                    image_url: None,
                };
                images::update_item_with_image(
                    &self.db,
                    self.objects.as_ref(),
                    &self.owner_id,
                    id,
                    &update,
                    payload,
                )
                .await
            }
        };

        match result {
            Ok(mutation) => {
                debug!(item_id = %mutation.item.id, "Item form submitted.");
                self.form = FormState::Idle;
                self.refresh().await?;
                Ok(mutation)
            }
            Err(e) => {
                self.form = Self::restore_item_form(item_id, draft);
                Err(e)
            }
        }
    }

    /// Deletes an empty category, then re-fetches the lists. Deletion is
    /// blocked while the category still holds items.
    pub async fn delete_category(&mut self, category_id: &str) -> Result<(), MenuError> {
        self.db
            .delete_category(category_id, &self.owner_id)
            .await?;
        self.refresh().await?;
        Ok(())
    }

    /// Deletes an item and its asset, then re-fetches the lists. If the
    /// deleted item was open in the edit form, the form is closed.
    pub async fn delete_item(&mut self, item_id: &str) -> Result<ItemDeletion, MenuError> {
        let deletion =
            images::delete_item_and_image(&self.db, self.objects.as_ref(), &self.owner_id, item_id)
                .await?;

        if let FormState::EditingItem { item_id: open, .. } = &self.form {
            if open == item_id {
                self.form = FormState::Idle;
            }
        }
        self.refresh().await?;
        Ok(deletion)
    }

    fn restore_item_form(item_id: Option<String>, draft: ItemDraft) -> FormState {
        match item_id {
            Some(item_id) => FormState::EditingItem { item_id, draft },
            None => FormState::CreatingItem(draft),
        }
    }
}
