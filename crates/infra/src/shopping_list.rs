//! Shopping-list service: one cart query, in-memory aggregation, rendering.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use foodgram_core::UserId;
use foodgram_recipes::{AggregatedLine, aggregate_usages, render_report};

use crate::read_model::CartUsageQuery;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShoppingListError {
    /// The cart could not be read; no partial list is produced.
    #[error("aggregation unavailable: {0}")]
    DataUnavailable(String),
}

/// Builds a user's shopping list from their cart.
///
/// Holds no state besides the data source; safe to share across requests.
#[derive(Debug, Clone)]
pub struct ShoppingListAggregator<Q> {
    source: Q,
}

impl<Q: CartUsageQuery> ShoppingListAggregator<Q> {
    pub fn new(source: Q) -> Self {
        Self { source }
    }

    /// Summed ingredient lines for every recipe in `user_id`'s cart, sorted by
    /// name then unit. An empty cart yields an empty list.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn build_shopping_list(
        &self,
        user_id: UserId,
    ) -> Result<Vec<AggregatedLine>, ShoppingListError> {
        let rows = self.source.cart_usages(user_id).await.map_err(|e| {
            warn!(error = %e, "cart usages unavailable");
            ShoppingListError::DataUnavailable(e.to_string())
        })?;

        let outcome = aggregate_usages(rows);

        for recipe_id in &outcome.skipped {
            warn!(%user_id, %recipe_id, "shopping cart references a missing recipe; skipping");
        }
        debug!(lines = outcome.lines.len(), "shopping list built");

        Ok(outcome.lines)
    }

    /// The list rendered as the `shopping_cart.txt` body.
    pub async fn render_shopping_list(&self, user_id: UserId) -> Result<String, ShoppingListError> {
        let lines = self.build_shopping_list(user_id).await?;
        Ok(render_report(&lines))
    }
}
