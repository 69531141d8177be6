use serde::Serialize;

use foodgram_recipes::{CartMembership, Favorite};

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: String,
}

/// Body of a successful add-to-cart or add-favorite:
/// `{"user": ..., "recipe": ...}`.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub user: String,
    pub recipe: String,
}

impl From<CartMembership> for MembershipResponse {
    fn from(m: CartMembership) -> Self {
        Self {
            user: m.user_id.to_string(),
            recipe: m.recipe_id.to_string(),
        }
    }
}

impl From<Favorite> for MembershipResponse {
    fn from(f: Favorite) -> Self {
        Self {
            user: f.user_id.to_string(),
            recipe: f.recipe_id.to_string(),
        }
    }
}
