//! # Domain Types
//!
//! The records that make up a published menu (cafe, category, item),
//! the field buffers (`*Draft`, `ItemUpdate`) that management forms
//! submit, and the fixed-point [`Price`] type.

use crate::errors::MenuError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A menu item price as a non-negative fixed-point decimal.
///
/// Prices are always parsed from user-supplied text; a non-numeric or
/// negative input is a validation failure, never a stored value. The
/// canonical text form (`to_string`) is what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Parses user-supplied decimal text into a normalized price.
    pub fn parse(input: &str) -> Result<Self, MenuError> {
        let value = Decimal::from_str(input.trim()).map_err(|_| {
            MenuError::Validation(format!("Price '{input}' is not a valid number"))
        })?;
        if value.is_sign_negative() {
            return Err(MenuError::Validation(format!(
                "Price '{input}' must not be negative"
            )));
        }
        Ok(Self(value.normalize()))
    }

    /// Re-parses a value previously stored by this crate.
    ///
    /// Unlike [`Price::parse`], a failure here means the stored row is
    /// corrupt, not that the user typed something wrong.
    pub(crate) fn from_stored(stored: &str) -> Result<Self, MenuError> {
        Decimal::from_str(stored)
            .map(|d| Self(d.normalize()))
            .map_err(|e| MenuError::DataIntegrity(format!("Stored price '{stored}': {e}")))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cafe profile. The owner reference is immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cafe {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The onboarding form fields for a new cafe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CafeDraft {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CafeDraft {
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.name.trim().is_empty() {
            return Err(MenuError::Validation("Cafe name is required".to_string()));
        }
        Ok(())
    }
}

/// A menu category within a cafe.
///
/// `sort_order` is dense from 0 and assigned at creation time as the current
/// category count for the cafe; edits never reassign it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub cafe_id: String,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

/// The form fields for a new category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<(), MenuError> {
        if self.name.trim().is_empty() {
            return Err(MenuError::Validation(
                "Category name is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A priced menu item within a category.
///
/// `image_url` is a plain URL string into the object store, not a foreign
/// key; the image lifecycle flows in [`crate::images`] keep it consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub is_available: bool,
    pub sort_order: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The form fields for a new menu item.
///
/// `price` holds the raw user text; it is parsed during validation so a bad
/// value never reaches the store. `image_url` is filled in by the image
/// lifecycle flow, not by the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category_id: String,
    pub is_available: bool,
    pub image_url: Option<String>,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            price: String::new(),
            category_id: String::new(),
            is_available: true,
            image_url: None,
        }
    }
}

impl ItemDraft {
    /// Checks the required fields and returns the parsed price.
    pub fn validate(&self) -> Result<Price, MenuError> {
        if self.name.trim().is_empty() {
            return Err(MenuError::Validation("Item name is required".to_string()));
        }
        if self.category_id.trim().is_empty() {
            return Err(MenuError::Validation(
                "Select a category for the item".to_string(),
            ));
        }
        Price::parse(&self.price)
    }
}

/// A partial update of an existing menu item.
///
/// `None` fields are left unchanged. Moving an item to another category
/// keeps its existing `sort_order`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub is_available: Option<bool>,
    pub image_url: Option<String>,
}

impl ItemUpdate {
    /// Validates the populated fields and returns the parsed price, if any.
    pub fn validate(&self) -> Result<Option<Price>, MenuError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(MenuError::Validation("Item name is required".to_string()));
            }
        }
        match &self.price {
            Some(raw) => Price::parse(raw).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parses_plain_decimal_text() {
        let price = Price::parse("12.9").unwrap();
        assert_eq!(price.to_string(), "12.9");
    }

    #[test]
    fn price_normalizes_trailing_zeros() {
        let price = Price::parse("12.90").unwrap();
        assert_eq!(price.to_string(), "12.9");
    }

    #[test]
    fn price_trims_surrounding_whitespace() {
        let price = Price::parse(" 7 ").unwrap();
        assert_eq!(price.to_string(), "7");
    }

    #[test]
    fn price_rejects_non_numeric_input() {
        let err = Price::parse("abc").unwrap_err();
        assert!(matches!(err, MenuError::Validation(_)));
    }

    #[test]
    fn price_rejects_negative_input() {
        let err = Price::parse("-1").unwrap_err();
        assert!(matches!(err, MenuError::Validation(_)));
    }

    #[test]
    fn item_draft_requires_name_and_category() {
        let draft = ItemDraft {
            price: "5.00".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            draft.validate().unwrap_err(),
            MenuError::Validation(_)
        ));

        let draft = ItemDraft {
            name: "Flat White".to_string(),
            price: "5.00".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            draft.validate().unwrap_err(),
            MenuError::Validation(_)
        ));
    }
}
