use serde::{Deserialize, Serialize};

use foodgram_core::{DomainError, DomainResult, Entity, IngredientId, ValueObject};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_UNIT_LEN: usize = 20;

/// Shopping-list grouping key: ingredient name + measurement unit.
///
/// Field order matters: the derived `Ord` sorts by name first, then unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientKey {
    pub name: String,
    pub measurement_unit: String,
}

impl ValueObject for IngredientKey {}

/// Reference ingredient (immutable catalogue data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    id: IngredientId,
    name: String,
    measurement_unit: String,
}

impl Ingredient {
    pub fn new(
        id: IngredientId,
        name: impl Into<String>,
        measurement_unit: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let measurement_unit = measurement_unit.into().trim().to_string();

        if name.is_empty() {
            return Err(DomainError::validation("ingredient name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "ingredient name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if measurement_unit.is_empty() {
            return Err(DomainError::validation("measurement unit must not be empty"));
        }
        if measurement_unit.chars().count() > MAX_UNIT_LEN {
            return Err(DomainError::validation(format!(
                "measurement unit must be at most {MAX_UNIT_LEN} characters"
            )));
        }

        Ok(Self {
            id,
            name,
            measurement_unit,
        })
    }

    pub fn id_typed(&self) -> IngredientId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }

    pub fn key(&self) -> IngredientKey {
        IngredientKey {
            name: self.name.clone(),
            measurement_unit: self.measurement_unit.clone(),
        }
    }
}

impl Entity for Ingredient {
    type Id = IngredientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name_and_unit() {
        let ing = Ingredient::new(IngredientId::new(), "  Flour ", " g").unwrap();
        assert_eq!(ing.name(), "Flour");
        assert_eq!(ing.measurement_unit(), "g");
    }

    #[test]
    fn rejects_blank_unit() {
        let err = Ingredient::new(IngredientId::new(), "Salt", "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(Ingredient::new(IngredientId::new(), name, "g").is_err());
    }

    #[test]
    fn key_orders_by_name_then_unit() {
        let a = IngredientKey {
            name: "Milk".into(),
            measurement_unit: "ml".into(),
        };
        let b = IngredientKey {
            name: "Milk".into(),
            measurement_unit: "cup".into(),
        };
        let c = IngredientKey {
            name: "Egg".into(),
            measurement_unit: "pcs".into(),
        };
        let mut keys = vec![a.clone(), b.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }
}
