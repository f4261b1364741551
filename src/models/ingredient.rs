use serde::{Deserialize, Serialize};

use crate::constants::{ERR_FIELD_BLANK, ERR_NAME_TOO_LONG, MAX_NAME_LENGTH};
use crate::error::{Result, ValidationErrors};

/// Ingredient record stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

/// Shared reference data: something that can be bought, and the unit it is measured in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    pub measurement_unit: String,
}

impl Ingredient {
    pub fn from_record(id: u64, record: IngredientRecord) -> Self {
        Self {
            id,
            name: record.name,
            measurement_unit: record.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

impl NewIngredient {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", ERR_FIELD_BLANK);
        } else if self.name.chars().count() > MAX_NAME_LENGTH {
            errors.add("name", ERR_NAME_TOO_LONG);
        }
        if self.measurement_unit.chars().count() > MAX_NAME_LENGTH {
            errors.add("measurement_unit", ERR_NAME_TOO_LONG);
        }

        errors.into_result()
    }

    pub fn into_record(self) -> IngredientRecord {
        IngredientRecord {
            name: self.name.trim().to_string(),
            measurement_unit: self.measurement_unit.trim().to_string(),
        }
    }
}
