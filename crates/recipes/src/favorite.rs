use serde::{Deserialize, Serialize};

use foodgram_core::{RecipeId, UserId, ValueObject};

/// A recipe a user marked as a favorite. Unique per (user, recipe).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[serde(rename = "recipe")]
    pub recipe_id: RecipeId,
}

impl Favorite {
    pub fn new(user_id: UserId, recipe_id: RecipeId) -> Self {
        Self { user_id, recipe_id }
    }
}

impl ValueObject for Favorite {}
