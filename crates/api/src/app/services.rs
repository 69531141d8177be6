use std::sync::Arc;

use foodgram_infra::{
    InMemoryRecipeStore, PostgresRecipeStore, RecipeStore, ShoppingListAggregator, StoreError,
};

/// Shared per-process services handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn RecipeStore>,
    pub shopping_list: ShoppingListAggregator<Arc<dyn RecipeStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self {
            shopping_list: ShoppingListAggregator::new(store.clone()),
            store,
        }
    }
}

/// Postgres when a connection string is configured, in-memory otherwise.
pub async fn connect_store(database_url: Option<&str>) -> Result<Arc<dyn RecipeStore>, StoreError> {
    match database_url {
        Some(url) => {
            let store = PostgresRecipeStore::connect(url).await?;
            tracing::info!("using postgres recipe store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory recipe store");
            Ok(Arc::new(InMemoryRecipeStore::new()))
        }
    }
}
