pub mod ingredient;
pub mod recipe;
pub mod shopping;
pub mod tag;
pub mod user;

pub use ingredient::{Ingredient, IngredientRecord, NewIngredient};
pub use recipe::{
    IngredientAmount, NewRecipe, RecipeFilter, RecipeIngredientView, RecipeRecord, RecipeUpdate,
    RecipeView, ShortRecipe,
};
pub use shopping::{RenderedDocument, ShoppingListItem};
pub use tag::{NewTag, Tag, TagRecord};
pub use user::{NewUser, Profile, SubscriptionView, UserRecord};

use chrono::{DateTime, Utc};

/// Convert Unix timestamp to RFC3339 string, defaulting to now if invalid
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}
