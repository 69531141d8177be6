//! Recipes domain module.
//!
//! Business rules for the recipe catalogue, favorites, shopping-cart
//! membership and the shopping-list aggregation, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod cart;
pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod shopping_list;
pub mod tag;

pub use cart::CartMembership;
pub use favorite::Favorite;
pub use ingredient::{Ingredient, IngredientKey};
pub use recipe::{IngredientUsage, Recipe, RecipeDraft};
pub use shopping_list::{
    AggregatedLine, AggregationOutcome, CartUsage, CartUsageRow, aggregate_usages, render_report,
};
pub use tag::Tag;
