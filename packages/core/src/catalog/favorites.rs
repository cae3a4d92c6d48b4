use serde::{Deserialize, Serialize};
use vitrine_storage::EntityKind;

use crate::entity::{Entity, deserialize_opt_id};

/// Favorite products of one user. The row id is the user id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Favorites {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

impl Favorites {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            id: Some(user_id.to_string()),
            product_ids: Vec::new(),
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    /// Adds or removes the product; returns whether it is now a favorite.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            self.product_ids.retain(|id| id != product_id);
            false
        } else {
            self.product_ids.push(product_id.to_string());
            true
        }
    }
}

impl Entity for Favorites {
    const KIND: EntityKind = EntityKind::Favorites;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
