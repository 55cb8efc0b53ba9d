//! Category grouping for sheet display
//!
//! Turns a flat field list into display-ordered groups: explicit category
//! order first (entries that actually occur in the data), remaining
//! categories alphabetically, fields within a category by `order`
//! ascending with ties keeping their original relative order.

use serde::{Deserialize, Serialize};

use crate::entities::Field;

/// One display category and its ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub fields: Vec<Field>,
}

/// Group and order visible fields for display.
///
/// Hidden fields (`visible == false`) are dropped, and so are categories
/// that end up empty. An empty `category_order` falls back to all
/// categories in alphabetical order.
pub fn organize_by_category(fields: &[Field], category_order: &[String]) -> Vec<CategoryGroup> {
    let explicit: Vec<&str> = category_order.iter().map(String::as_str).collect();

    // Stable sort keeps declaration order for equal (category, order) keys
    let mut sorted: Vec<&Field> = fields.iter().filter(|f| f.visible).collect();
    sorted.sort_by(|a, b| {
        let ca = a.display_category();
        let cb = b.display_category();
        if ca != cb {
            return match (
                explicit.iter().position(|c| *c == ca),
                explicit.iter().position(|c| *c == cb),
            ) {
                (None, None) => ca.cmp(cb),
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (Some(_), None) => std::cmp::Ordering::Less,
                (Some(ia), Some(ib)) => ia.cmp(&ib),
            };
        }
        a.order.cmp(&b.order)
    });

    let mut groups: Vec<CategoryGroup> = Vec::new();

    // Explicit order first, keeping only categories present in the data
    for category in &explicit {
        let fields: Vec<Field> = sorted
            .iter()
            .filter(|f| f.display_category() == *category)
            .map(|f| (*f).clone())
            .collect();
        if !fields.is_empty() && !groups.iter().any(|g| g.name == *category) {
            groups.push(CategoryGroup {
                name: (*category).to_string(),
                fields,
            });
        }
    }

    // Remaining categories, alphabetically (ordinal compare)
    let mut remaining: Vec<&str> = sorted
        .iter()
        .map(|f| f.display_category())
        .filter(|c| !groups.iter().any(|g| g.name == *c))
        .collect();
    remaining.sort_unstable();
    remaining.dedup();

    for category in remaining {
        let fields: Vec<Field> = sorted
            .iter()
            .filter(|f| f.display_category() == category)
            .map(|f| (*f).clone())
            .collect();
        groups.push(CategoryGroup {
            name: category.to_string(),
            fields,
        });
    }

    groups
}

/// Ordered category names, for tab strips and headers.
pub fn category_names(groups: &[CategoryGroup]) -> Vec<&str> {
    groups.iter().map(|g| g.name.as_str()).collect()
}
