//! Infrastructure layer: storage adapters and the shopping-list service.

pub mod read_model;
pub mod shopping_list;


pub use read_model::{CartUsageQuery, InMemoryRecipeStore, PostgresRecipeStore, RecipeStore, StoreError};
pub use shopping_list::{ShoppingListAggregator, ShoppingListError};
