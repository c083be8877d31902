//! # Menu Aggregate View
//!
//! Pure read-side assembly: turns the repository's flat, pre-ordered
//! category and item rows into the category → items tree the display layer
//! renders. No re-sorting happens here; the repository's ordering is the
//! source of truth.

use crate::types::{Category, MenuItem};
use std::collections::HashMap;

/// One category with its ordered items. A category with no items is an
/// explicit empty state, never omitted.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub category: Category,
    pub items: Vec<MenuItem>,
}

impl CategoryView {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds the aggregate menu tree from flat rows.
///
/// Items are grouped by `category_id` in a single pass, preserving the
/// repository's ordering within each group. Items whose category is not in
/// `categories` are dropped; the repository never produces such rows for a
/// consistent cafe.
pub fn build_menu_view(categories: &[Category], items: &[MenuItem]) -> Vec<CategoryView> {
    let mut grouped: HashMap<&str, Vec<MenuItem>> = HashMap::new();
    for item in items {
        grouped
            .entry(item.category_id.as_str())
            .or_default()
            .push(item.clone());
    }

    categories
        .iter()
        .map(|category| CategoryView {
            category: category.clone(),
            items: grouped.remove(category.id.as_str()).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Price;
    use chrono::Utc;

    fn category(id: &str, sort_order: i64) -> Category {
        Category {
            id: id.to_string(),
            cafe_id: "cafe-1".to_string(),
            name: format!("Category {id}"),
            description: None,
            sort_order,
            created_at: Utc::now(),
        }
    }

    fn item(id: &str, category_id: &str, sort_order: i64) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            category_id: category_id.to_string(),
            name: format!("Item {id}"),
            description: None,
            price: Price::parse("4.5").unwrap(),
            is_available: true,
            sort_order,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_items_under_their_categories_in_order() {
        let categories = vec![category("a", 0), category("b", 1)];
        let items = vec![
            item("1", "a", 0),
            item("2", "b", 0),
            item("3", "a", 1),
            item("4", "b", 1),
        ];

        let view = build_menu_view(&categories, &items);

        assert_eq!(view.len(), 2);
        let ids: Vec<&str> = view[0].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        let ids: Vec<&str> = view[1].items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4"]);
    }

    #[test]
    fn empty_category_is_an_explicit_empty_state() {
        let categories = vec![category("a", 0), category("b", 1)];
        let items = vec![item("1", "a", 0)];

        let view = build_menu_view(&categories, &items);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].item_count(), 1);
        assert!(view[1].is_empty());
    }

    #[test]
    fn zero_categories_yield_an_empty_view() {
        let view = build_menu_view(&[], &[]);
        assert!(view.is_empty());
    }
}
