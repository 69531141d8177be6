use serde::{Deserialize, Serialize};

use foodgram_core::{RecipeId, UserId, ValueObject};

/// A recipe selected by a user for their shopping list.
///
/// Unique per (user, recipe); storage enforces the uniqueness.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartMembership {
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "recipe")]
    pub recipe_id: RecipeId,
}

impl CartMembership {
    pub fn new(user_id: UserId, recipe_id: RecipeId) -> Self {
        Self { user_id, recipe_id }
    }
}

impl ValueObject for CartMembership {}
