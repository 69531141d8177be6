//! Shopping-list aggregation and rendering.
//!
//! Input is the flat set of ingredient usages of every recipe in one user's
//! cart, as returned by a single storage query. Output is one line per
//! distinct (ingredient name, measurement unit) with the summed amount.
//!
//! Lines are always sorted by name, then unit. Storage row order never
//! leaks into the result, so two calls over the same data render the same
//! bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use foodgram_core::{RecipeId, ValueObject};

use crate::ingredient::IngredientKey;

/// Separator between ingredient and total in a rendered line (U+2013).
pub const AMOUNT_SEPARATOR: &str = "–";

/// One ingredient usage belonging to a recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUsage {
    pub recipe_id: RecipeId,
    pub ingredient_name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

/// A row of the cart-usage query.
///
/// `DanglingRecipe` is a cart membership whose recipe is gone from the
/// catalogue. Referential integrity should make it impossible; when it shows
/// up anyway it is skipped, not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartUsageRow {
    Usage(CartUsage),
    DanglingRecipe { recipe_id: RecipeId },
}

/// One line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedLine {
    pub ingredient_name: String,
    pub measurement_unit: String,
    pub total_amount: u64,
}

impl ValueObject for AggregatedLine {}

impl core::fmt::Display for AggregatedLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} ({}) {} {}",
            self.ingredient_name, self.measurement_unit, AMOUNT_SEPARATOR, self.total_amount
        )
    }
}

/// Result of aggregating a batch of cart rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationOutcome {
    /// Sorted by ingredient name, then measurement unit.
    pub lines: Vec<AggregatedLine>,
    /// Recipes referenced by the cart but missing from the catalogue.
    pub skipped: Vec<RecipeId>,
}

/// Group usages by (name, unit) and sum their amounts.
///
/// The same name recorded with two different units yields two lines; units
/// are never converted or merged.
pub fn aggregate_usages<I>(rows: I) -> AggregationOutcome
where
    I: IntoIterator<Item = CartUsageRow>,
{
    let mut totals: BTreeMap<IngredientKey, u64> = BTreeMap::new();
    let mut skipped = Vec::new();

    for row in rows {
        match row {
            CartUsageRow::Usage(usage) => {
                let key = IngredientKey {
                    name: usage.ingredient_name,
                    measurement_unit: usage.measurement_unit,
                };
                *totals.entry(key).or_insert(0) += u64::from(usage.amount);
            }
            CartUsageRow::DanglingRecipe { recipe_id } => skipped.push(recipe_id),
        }
    }

    let lines = totals
        .into_iter()
        .map(|(key, total_amount)| AggregatedLine {
            ingredient_name: key.name,
            measurement_unit: key.measurement_unit,
            total_amount,
        })
        .collect();

    AggregationOutcome { lines, skipped }
}

/// Render lines as the downloadable text report.
///
/// One `"{name} ({unit}) – {total}"` per line, joined by `\n`, with no
/// trailing newline. No lines render as the empty string.
pub fn render_report(lines: &[AggregatedLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
