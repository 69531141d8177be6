use std::sync::Arc;

use thiserror::Error;

use foodgram_core::{RecipeId, UserId};
use foodgram_recipes::{CartMembership, CartUsageRow, Favorite, Recipe};

/// Storage operation error.
///
/// These are **infrastructure errors**; domain validation failures are
/// reported by `foodgram_core::DomainError` before anything reaches storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached or the query failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint hit (duplicate cart entry or favorite,
    /// ingredient key clash).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored row no longer passes domain validation.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Read contract used by the shopping-list aggregator.
///
/// One call returns every ingredient usage of every recipe in the user's
/// cart. Implementations must answer with a single backend round trip, not
/// a query per recipe.
#[async_trait::async_trait]
pub trait CartUsageQuery: Send + Sync {
    async fn cart_usages(&self, user_id: UserId) -> Result<Vec<CartUsageRow>, StoreError>;
}

/// Recipe catalogue, favorites and cart membership storage.
#[async_trait::async_trait]
pub trait RecipeStore: CartUsageQuery {
    /// Insert or replace a recipe together with its full ingredient set.
    async fn save_recipe(&self, recipe: Recipe) -> Result<(), StoreError>;

    async fn get_recipe(&self, recipe_id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Delete a recipe; its usages, favorites and cart memberships go with it.
    async fn delete_recipe(&self, recipe_id: RecipeId) -> Result<(), StoreError>;

    /// `NotFound` if the recipe does not exist, `Conflict` if already in the cart.
    async fn add_to_cart(&self, membership: CartMembership) -> Result<(), StoreError>;

    /// `NotFound` if the pair does not exist.
    async fn remove_from_cart(&self, membership: CartMembership) -> Result<(), StoreError>;

    /// `NotFound` if the recipe does not exist, `Conflict` if already a favorite.
    async fn add_favorite(&self, favorite: Favorite) -> Result<(), StoreError>;

    /// `NotFound` if the pair does not exist.
    async fn remove_favorite(&self, favorite: Favorite) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> CartUsageQuery for Arc<S>
where
    S: CartUsageQuery + ?Sized,
{
    async fn cart_usages(&self, user_id: UserId) -> Result<Vec<CartUsageRow>, StoreError> {
        (**self).cart_usages(user_id).await
    }
}

#[async_trait::async_trait]
impl<S> RecipeStore for Arc<S>
where
    S: RecipeStore + ?Sized,
{
    async fn save_recipe(&self, recipe: Recipe) -> Result<(), StoreError> {
        (**self).save_recipe(recipe).await
    }

    async fn get_recipe(&self, recipe_id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        (**self).get_recipe(recipe_id).await
    }

    async fn delete_recipe(&self, recipe_id: RecipeId) -> Result<(), StoreError> {
        (**self).delete_recipe(recipe_id).await
    }

    async fn add_to_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        (**self).add_to_cart(membership).await
    }

    async fn remove_from_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        (**self).remove_from_cart(membership).await
    }

    async fn add_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        (**self).add_favorite(favorite).await
    }

    async fn remove_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        (**self).remove_favorite(favorite).await
    }
}
