use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use foodgram_core::{IngredientId, RecipeId, UserId};
use foodgram_recipes::{
    CartMembership, CartUsage, CartUsageRow, Favorite, Ingredient, IngredientKey, Recipe,
};

use super::store::{CartUsageQuery, RecipeStore, StoreError};

#[derive(Debug, Default)]
struct State {
    ingredients: HashMap<IngredientId, Ingredient>,
    recipes: HashMap<RecipeId, Recipe>,
    favorites: BTreeSet<Favorite>,
    carts: BTreeSet<CartMembership>,
}

impl State {
    /// Whether `ingredient` can join the catalogue: a known id must keep its
    /// (name, unit), and a new id must not reuse a taken (name, unit).
    fn check_ingredient(&self, ingredient: &Ingredient) -> Result<(), StoreError> {
        let key = ingredient.key();
        match self.ingredients.get(&ingredient.id_typed()) {
            Some(known) if known.key() != key => Err(StoreError::Conflict(format!(
                "ingredient {} is registered as '{} ({})'",
                ingredient.id_typed(),
                known.name(),
                known.measurement_unit()
            ))),
            Some(_) => Ok(()),
            None if self.ingredients.values().any(|i| i.key() == key) => Err(key_conflict(&key)),
            None => Ok(()),
        }
    }

    fn register_ingredient(&mut self, ingredient: &Ingredient) -> Result<(), StoreError> {
        self.check_ingredient(ingredient)?;
        self.ingredients
            .entry(ingredient.id_typed())
            .or_insert_with(|| ingredient.clone());
        Ok(())
    }
}

fn key_conflict(key: &IngredientKey) -> StoreError {
    StoreError::Conflict(format!(
        "ingredient '{} ({})' already exists",
        key.name, key.measurement_unit
    ))
}

/// In-memory recipe store for tests/dev.
///
/// A single `RwLock` guards the whole state, so each read sees one
/// consistent snapshot of recipes and carts.
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    inner: RwLock<State>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add reference data without attaching it to a recipe.
    pub fn save_ingredient(&self, ingredient: Ingredient) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.register_ingredient(&ingredient)
    }

    pub fn ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        let state = self.read()?;
        let mut all: Vec<_> = state.ingredients.values().cloned().collect();
        all.sort_by_key(Ingredient::key);
        Ok(all)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("recipe store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("recipe store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CartUsageQuery for InMemoryRecipeStore {
    async fn cart_usages(&self, user_id: UserId) -> Result<Vec<CartUsageRow>, StoreError> {
        let state = self.read()?;

        let mut rows = Vec::new();
        for membership in state.carts.iter().filter(|m| m.user_id == user_id) {
            match state.recipes.get(&membership.recipe_id) {
                Some(recipe) => rows.extend(recipe.ingredients().iter().map(|usage| {
                    CartUsageRow::Usage(CartUsage {
                        recipe_id: membership.recipe_id,
                        ingredient_name: usage.ingredient.name().to_string(),
                        measurement_unit: usage.ingredient.measurement_unit().to_string(),
                        amount: usage.amount,
                    })
                })),
                None => rows.push(CartUsageRow::DanglingRecipe {
                    recipe_id: membership.recipe_id,
                }),
            }
        }

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn save_recipe(&self, recipe: Recipe) -> Result<(), StoreError> {
        let mut state = self.write()?;

        // Check every ingredient before registering any, so a conflict leaves
        // the catalogue untouched.
        let mut keys = HashSet::with_capacity(recipe.ingredients().len());
        let mut ids = HashSet::with_capacity(recipe.ingredients().len());
        for usage in recipe.ingredients() {
            let key = usage.ingredient.key();
            if !keys.insert(key.clone()) {
                return Err(key_conflict(&key));
            }
            if !ids.insert(usage.ingredient.id_typed()) {
                return Err(StoreError::Conflict(format!(
                    "ingredient {} appears under two names",
                    usage.ingredient.id_typed()
                )));
            }
            state.check_ingredient(&usage.ingredient)?;
        }
        for usage in recipe.ingredients() {
            state.register_ingredient(&usage.ingredient)?;
        }

        state.recipes.insert(recipe.id_typed(), recipe);
        Ok(())
    }

    async fn get_recipe(&self, recipe_id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.read()?.recipes.get(&recipe_id).cloned())
    }

    async fn delete_recipe(&self, recipe_id: RecipeId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.recipes.remove(&recipe_id).is_none() {
            return Err(StoreError::NotFound(format!("recipe {recipe_id}")));
        }
        state.favorites.retain(|f| f.recipe_id != recipe_id);
        state.carts.retain(|m| m.recipe_id != recipe_id);
        Ok(())
    }

    async fn add_to_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.recipes.contains_key(&membership.recipe_id) {
            return Err(StoreError::NotFound(format!("recipe {}", membership.recipe_id)));
        }
        if !state.carts.insert(membership) {
            return Err(StoreError::Conflict(format!(
                "recipe {} is already in the shopping cart",
                membership.recipe_id
            )));
        }
        Ok(())
    }

    async fn remove_from_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.carts.remove(&membership) {
            return Err(StoreError::NotFound(format!(
                "recipe {} is not in the shopping cart",
                membership.recipe_id
            )));
        }
        Ok(())
    }

    async fn add_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.recipes.contains_key(&favorite.recipe_id) {
            return Err(StoreError::NotFound(format!("recipe {}", favorite.recipe_id)));
        }
        if !state.favorites.insert(favorite) {
            return Err(StoreError::Conflict(format!(
                "recipe {} is already a favorite",
                favorite.recipe_id
            )));
        }
        Ok(())
    }

    async fn remove_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.favorites.remove(&favorite) {
            return Err(StoreError::NotFound(format!(
                "recipe {} is not a favorite",
                favorite.recipe_id
            )));
        }
        Ok(())
    }
}
