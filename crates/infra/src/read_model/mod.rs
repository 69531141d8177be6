//! Recipe catalogue and shopping-cart storage.

pub mod in_memory;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryRecipeStore;
pub use postgres::PostgresRecipeStore;
pub use store::{CartUsageQuery, RecipeStore, StoreError};
