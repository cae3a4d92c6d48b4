//! Product catalog
//!
//! Products and categories as stored by the back office, plus the public
//! catalog query (search, filters, sort, pagination) and per-user favorites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_storage::EntityKind;

use crate::entity::{Entity, default_true, deserialize_opt_id};

mod favorites;
mod query;

pub use favorites::Favorites;
pub use query::{Page, ProductQuery, ProductSort, query_products};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Internal product code shown on the catalog card. Always written so an
    /// update can clear it.
    #[serde(default)]
    pub code: Option<String>,
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Products;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Categories;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Categories in display order
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by_cached_key(|c| vitrine_types::utils::fold_search_text(&c.name));
}
