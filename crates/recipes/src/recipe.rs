use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use foodgram_core::{DomainError, DomainResult, Entity, RecipeId, UserId};

use crate::ingredient::Ingredient;
use crate::tag::Tag;

pub const MAX_RECIPE_NAME_LEN: usize = 40;
pub const MIN_COOKING_TIME: u32 = 1;
/// Largest value a Postgres `INTEGER` column holds.
pub const MAX_COOKING_TIME: u32 = i32::MAX as u32;
pub const MIN_AMOUNT: u32 = 1;
pub const MAX_AMOUNT: u32 = i32::MAX as u32;

/// How much of an ingredient a recipe requires.
///
/// The owning recipe is implied by the containing `Recipe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientUsage {
    pub ingredient: Ingredient,
    pub amount: u32,
}

impl IngredientUsage {
    pub fn new(ingredient: Ingredient, amount: u32) -> Self {
        Self { ingredient, amount }
    }
}

/// Unvalidated recipe input, as submitted by an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: u32,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<IngredientUsage>,
}

/// Recipe entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    id: RecipeId,
    author: UserId,
    name: String,
    text: String,
    image: Option<String>,
    cooking_time: u32,
    tags: Vec<Tag>,
    ingredients: Vec<IngredientUsage>,
}

impl Recipe {
    /// Validate a draft and build the recipe.
    ///
    /// Ingredients must be non-empty, each with an amount in
    /// `MIN_AMOUNT..=MAX_AMOUNT` and appearing at most once by (name, unit);
    /// tags must be unique by slug.
    pub fn new(id: RecipeId, author: UserId, draft: RecipeDraft) -> DomainResult<Self> {
        let RecipeDraft {
            name,
            text,
            image,
            cooking_time,
            tags,
            ingredients,
        } = draft;

        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("recipe name must not be empty"));
        }
        if name.chars().count() > MAX_RECIPE_NAME_LEN {
            return Err(DomainError::validation(format!(
                "recipe name must be at most {MAX_RECIPE_NAME_LEN} characters"
            )));
        }
        if text.trim().is_empty() {
            return Err(DomainError::validation("recipe text must not be empty"));
        }
        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
            return Err(DomainError::validation(format!(
                "cooking time must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME}"
            )));
        }
        if ingredients.is_empty() {
            return Err(DomainError::validation(
                "recipe must have at least one ingredient",
            ));
        }

        let mut seen = HashSet::with_capacity(ingredients.len());
        let mut ids = HashSet::with_capacity(ingredients.len());
        for usage in &ingredients {
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&usage.amount) {
                return Err(DomainError::validation(format!(
                    "amount of '{}' must be between {MIN_AMOUNT} and {MAX_AMOUNT}",
                    usage.ingredient.name()
                )));
            }
            if !seen.insert(usage.ingredient.key()) || !ids.insert(usage.ingredient.id_typed()) {
                return Err(DomainError::invariant(format!(
                    "ingredient '{}' is listed more than once",
                    usage.ingredient.name()
                )));
            }
        }

        let mut slugs = HashSet::with_capacity(tags.len());
        for tag in &tags {
            if !slugs.insert(tag.slug()) {
                return Err(DomainError::invariant(format!(
                    "tag '{}' is listed more than once",
                    tag.slug()
                )));
            }
        }

        Ok(Self {
            id,
            author,
            name,
            text,
            image,
            cooking_time,
            tags,
            ingredients,
        })
    }

    pub fn id_typed(&self) -> RecipeId {
        self.id
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn cooking_time(&self) -> u32 {
        self.cooking_time
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn ingredients(&self) -> &[IngredientUsage] {
        &self.ingredients
    }
}

impl Entity for Recipe {
    type Id = RecipeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
