use serde::{Deserialize, Serialize};

use crate::models::{Profile, Tag};

/// Recipe record stored in redb
///
/// Ingredient amounts and tags live in their own join tables keyed by the recipe id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// `None` once the author account has been removed
    pub author: Option<u64>,
    pub name: String,
    pub text: String,
    pub cooking_time: u32,
    /// Reference returned by the image store
    pub image: String,
    /// When the recipe was created (Unix timestamp)
    pub created_at: i64,
}

/// One `{id, amount}` entry of a recipe's ingredient list as submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: u64,
    pub amount: i64,
}

impl IngredientAmount {
    pub fn new(id: u64, amount: i64) -> Self {
        Self { id, amount }
    }
}

/// Input for recipe creation
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cooking_time: i64,
    /// Raw image payload, handed to the image store untouched
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<u64>,
}

/// Input for recipe update; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    /// When present, replaces the whole ingredient list
    pub ingredients: Option<Vec<IngredientAmount>>,
    /// When present, replaces the whole tag set
    pub tags: Option<Vec<u64>>,
}

/// Ingredient line of a recipe, resolved against the ingredient catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredientView {
    pub id: u64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: u64,
    pub author: Option<Profile>,
    pub name: String,
    pub text: String,
    pub cooking_time: u32,
    pub image: String,
    pub created_at: String,
    pub ingredients: Vec<RecipeIngredientView>,
    pub tags: Vec<Tag>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short projection returned by favorite/cart toggles and subscription previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipe {
    pub id: u64,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

impl ShortRecipe {
    pub fn from_record(id: u64, record: &RecipeRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            image: record.image.clone(),
            cooking_time: record.cooking_time,
        }
    }
}

/// Recipe list filters
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author: Option<u64>,
    /// Keep recipes carrying any of these tag slugs; empty means no tag filter
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_recipe_missing_lists_default_to_empty() {
        let recipe: NewRecipe = serde_json::from_str(
            r#"{"name": "Soup", "text": "Boil", "cooking_time": 5, "image": "x"}"#,
        )
        .unwrap();
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn test_update_distinguishes_omitted_from_empty() {
        let update: RecipeUpdate = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        assert!(update.ingredients.is_none());
        assert_eq!(update.tags, Some(vec![]));
    }

    #[test]
    fn test_negative_amount_still_deserializes() {
        let entry: IngredientAmount = serde_json::from_str(r#"{"id": 3, "amount": -5}"#).unwrap();
        assert_eq!(entry, IngredientAmount::new(3, -5));
    }
}
