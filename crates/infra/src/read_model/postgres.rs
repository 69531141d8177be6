//! Postgres-backed recipe store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (other) | any other | `Unavailable` |
//! | PoolClosed, IO, TLS, ... | n/a | `Unavailable` |
//!
//! ## Cart usage query
//!
//! `cart_usages` is one `LEFT JOIN` starting from `shopping_cart`, so a cart
//! row whose recipe has vanished still comes back (with NULL recipe columns)
//! and surfaces as `CartUsageRow::DanglingRecipe`.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use foodgram_core::{IngredientId, RecipeId, UserId};
use foodgram_recipes::{
    CartMembership, CartUsage, CartUsageRow, Favorite, Ingredient, IngredientUsage, Recipe,
    RecipeDraft, Tag,
};

use super::store::{CartUsageQuery, RecipeStore, StoreError};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Postgres-backed recipe + cart store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; every multi-table
/// write runs inside one transaction.
#[derive(Debug, Clone)]
pub struct PostgresRecipeStore {
    pool: Arc<PgPool>,
}

impl PostgresRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and apply the schema (idempotent).
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.setup().await?;
        Ok(store)
    }

    pub async fn setup(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("setup", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CartUsageQuery for PostgresRecipeStore {
    #[instrument(
        skip(self),
        fields(user_id = %user_id, row_count = tracing::field::Empty),
        err
    )]
    async fn cart_usages(&self, user_id: UserId) -> Result<Vec<CartUsageRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                sc.recipe_id        AS cart_recipe_id,
                r.id                AS recipe_id,
                i.name              AS ingredient_name,
                i.measurement_unit  AS measurement_unit,
                ri.amount           AS amount
            FROM shopping_cart sc
            LEFT JOIN recipes r ON r.id = sc.recipe_id
            LEFT JOIN recipe_ingredients ri ON ri.recipe_id = r.id
            LEFT JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("cart_usages", e))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let cart_recipe_id: uuid::Uuid = row
                .try_get("cart_recipe_id")
                .map_err(|e| map_sqlx_error("cart_usages", e))?;
            let recipe_id: Option<uuid::Uuid> = row
                .try_get("recipe_id")
                .map_err(|e| map_sqlx_error("cart_usages", e))?;

            if recipe_id.is_none() {
                out.push(CartUsageRow::DanglingRecipe {
                    recipe_id: RecipeId::from_uuid(cart_recipe_id),
                });
                continue;
            }

            let name: Option<String> = row
                .try_get("ingredient_name")
                .map_err(|e| map_sqlx_error("cart_usages", e))?;
            let unit: Option<String> = row
                .try_get("measurement_unit")
                .map_err(|e| map_sqlx_error("cart_usages", e))?;
            let amount: Option<i32> = row
                .try_get("amount")
                .map_err(|e| map_sqlx_error("cart_usages", e))?;

            // A recipe without usages joins to all-NULL ingredient columns.
            let (Some(ingredient_name), Some(measurement_unit), Some(amount)) = (name, unit, amount)
            else {
                continue;
            };
            let amount = u32::try_from(amount).map_err(|_| {
                StoreError::Corrupt(format!(
                    "negative amount {amount} for recipe {cart_recipe_id}"
                ))
            })?;

            out.push(CartUsageRow::Usage(CartUsage {
                recipe_id: RecipeId::from_uuid(cart_recipe_id),
                ingredient_name,
                measurement_unit,
                amount,
            }));
        }

        Span::current().record("row_count", out.len());
        Ok(out)
    }
}

#[async_trait::async_trait]
impl RecipeStore for PostgresRecipeStore {
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id_typed()), err)]
    async fn save_recipe(&self, recipe: Recipe) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO recipes (id, author_id, name, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                text = EXCLUDED.text,
                image = EXCLUDED.image,
                cooking_time = EXCLUDED.cooking_time
            "#,
        )
        .bind(recipe.id_typed().as_uuid())
        .bind(recipe.author().as_uuid())
        .bind(recipe.name())
        .bind(recipe.text())
        .bind(recipe.image())
        .bind(to_db_int("cooking_time", recipe.cooking_time())?)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_recipe", e))?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe.id_typed().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_recipe_ingredients", e))?;

        for usage in recipe.ingredients() {
            sqlx::query(
                r#"
                INSERT INTO ingredients (id, name, measurement_unit)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(usage.ingredient.id_typed().as_uuid())
            .bind(usage.ingredient.name())
            .bind(usage.ingredient.measurement_unit())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_ingredient", e))?;

            // A known id must keep its (name, unit).
            let stored = sqlx::query("SELECT name, measurement_unit FROM ingredients WHERE id = $1")
                .bind(usage.ingredient.id_typed().as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_ingredient", e))?;
            let stored_name: String = stored
                .try_get("name")
                .map_err(|e| map_sqlx_error("check_ingredient", e))?;
            let stored_unit: String = stored
                .try_get("measurement_unit")
                .map_err(|e| map_sqlx_error("check_ingredient", e))?;
            if stored_name != usage.ingredient.name() || stored_unit != usage.ingredient.measurement_unit() {
                return Err(StoreError::Conflict(format!(
                    "ingredient {} is registered as '{stored_name} ({stored_unit})'",
                    usage.ingredient.id_typed()
                )));
            }

            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
            )
            .bind(recipe.id_typed().as_uuid())
            .bind(usage.ingredient.id_typed().as_uuid())
            .bind(to_db_int("amount", usage.amount)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_recipe_ingredient", e))?;
        }

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe.id_typed().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_recipe_tags", e))?;

        for tag in recipe.tags() {
            sqlx::query(
                r#"
                INSERT INTO tags (slug, name, color)
                VALUES ($1, $2, $3)
                ON CONFLICT (slug) DO NOTHING
                "#,
            )
            .bind(tag.slug())
            .bind(tag.name())
            .bind(tag.color())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_tag", e))?;

            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_slug) VALUES ($1, $2)")
                .bind(recipe.id_typed().as_uuid())
                .bind(tag.slug())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_recipe_tag", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(recipe_id = %recipe_id), err)]
    async fn get_recipe(&self, recipe_id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        let Some(row) = sqlx::query(
            "SELECT author_id, name, text, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(recipe_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_recipe", e))?
        else {
            return Ok(None);
        };

        let author_id: uuid::Uuid = row.try_get("author_id").map_err(|e| map_sqlx_error("get_recipe", e))?;
        let name: String = row.try_get("name").map_err(|e| map_sqlx_error("get_recipe", e))?;
        let text: String = row.try_get("text").map_err(|e| map_sqlx_error("get_recipe", e))?;
        let image: Option<String> = row.try_get("image").map_err(|e| map_sqlx_error("get_recipe", e))?;
        let cooking_time: i32 = row
            .try_get("cooking_time")
            .map_err(|e| map_sqlx_error("get_recipe", e))?;

        let usage_rows = sqlx::query(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_recipe_ingredients", e))?;

        let mut ingredients = Vec::with_capacity(usage_rows.len());
        for r in usage_rows {
            let id: uuid::Uuid = r.try_get("id").map_err(|e| map_sqlx_error("get_recipe_ingredients", e))?;
            let ing_name: String = r.try_get("name").map_err(|e| map_sqlx_error("get_recipe_ingredients", e))?;
            let unit: String = r
                .try_get("measurement_unit")
                .map_err(|e| map_sqlx_error("get_recipe_ingredients", e))?;
            let amount: i32 = r.try_get("amount").map_err(|e| map_sqlx_error("get_recipe_ingredients", e))?;

            let ingredient = Ingredient::new(IngredientId::from_uuid(id), ing_name, unit)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            let amount = u32::try_from(amount)
                .map_err(|_| StoreError::Corrupt(format!("negative amount {amount}")))?;
            ingredients.push(IngredientUsage::new(ingredient, amount));
        }

        let tag_rows = sqlx::query(
            r#"
            SELECT t.slug, t.name, t.color
            FROM recipe_tags rt
            JOIN tags t ON t.slug = rt.tag_slug
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_recipe_tags", e))?;

        let mut tags = Vec::with_capacity(tag_rows.len());
        for r in tag_rows {
            let slug: String = r.try_get("slug").map_err(|e| map_sqlx_error("get_recipe_tags", e))?;
            let tag_name: String = r.try_get("name").map_err(|e| map_sqlx_error("get_recipe_tags", e))?;
            let color: String = r.try_get("color").map_err(|e| map_sqlx_error("get_recipe_tags", e))?;
            tags.push(Tag::new(tag_name, color, slug).map_err(|e| StoreError::Corrupt(e.to_string()))?);
        }

        let draft = RecipeDraft {
            name,
            text,
            image,
            cooking_time: u32::try_from(cooking_time).map_err(|_| {
                StoreError::Corrupt(format!("negative cooking_time {cooking_time}"))
            })?,
            tags,
            ingredients,
        };
        let recipe = Recipe::new(recipe_id, UserId::from_uuid(author_id), draft)
            .map_err(|e| StoreError::Corrupt(format!("recipe {recipe_id}: {e}")))?;

        Ok(Some(recipe))
    }

    #[instrument(skip(self), fields(recipe_id = %recipe_id), err)]
    async fn delete_recipe(&self, recipe_id: RecipeId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_recipe", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("recipe {recipe_id}")));
        }
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(user_id = %membership.user_id, recipe_id = %membership.recipe_id),
        err
    )]
    async fn add_to_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO shopping_cart (user_id, recipe_id) VALUES ($1, $2)")
            .bind(membership.user_id.as_uuid())
            .bind(membership.recipe_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_to_cart", e))?;
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(user_id = %membership.user_id, recipe_id = %membership.recipe_id),
        err
    )]
    async fn remove_from_cart(&self, membership: CartMembership) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2")
            .bind(membership.user_id.as_uuid())
            .bind(membership.recipe_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_from_cart", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "recipe {} is not in the shopping cart",
                membership.recipe_id
            )));
        }
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(user_id = %favorite.user_id, recipe_id = %favorite.recipe_id),
        err
    )]
    async fn add_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO favorites (user_id, recipe_id) VALUES ($1, $2)")
            .bind(favorite.user_id.as_uuid())
            .bind(favorite.recipe_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_favorite", e))?;
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(user_id = %favorite.user_id, recipe_id = %favorite.recipe_id),
        err
    )]
    async fn remove_favorite(&self, favorite: Favorite) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(favorite.user_id.as_uuid())
            .bind(favorite.recipe_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_favorite", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "recipe {} is not a favorite",
                favorite.recipe_id
            )));
        }
        Ok(())
    }
}

/// `INTEGER` columns are signed 32-bit; refuse values that would not
/// round-trip instead of storing something else.
fn to_db_int(column: &str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::Corrupt(format!("{column} {value} exceeds INTEGER range")))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}
