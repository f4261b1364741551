//! Input rules and authorization guards.
//!
//! Everything here is a pure predicate. Rules that need stored state (unknown
//! ingredient or tag ids) are checked by the services inside the same write
//! transaction as the mutation.

use std::collections::HashSet;

use crate::constants::*;
use crate::error::{AppError, Result, ValidationErrors};
use crate::models::{IngredientAmount, NewRecipe, RecipeRecord, RecipeUpdate};

pub fn check_ingredients(ingredients: &[IngredientAmount], errors: &mut ValidationErrors) {
    if ingredients.is_empty() {
        errors.add("ingredients", ERR_INGREDIENTS_REQUIRED);
        return;
    }

    let mut seen = HashSet::with_capacity(ingredients.len());
    if !ingredients.iter().all(|entry| seen.insert(entry.id)) {
        errors.add("ingredients", ERR_INGREDIENTS_DUPLICATED);
    }

    if ingredients
        .iter()
        .any(|entry| !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&entry.amount))
    {
        errors.add("ingredients", ERR_AMOUNT_OUT_OF_RANGE);
    }
}

pub fn check_tags(tags: &[u64], errors: &mut ValidationErrors) {
    if tags.is_empty() {
        errors.add("tags", ERR_TAGS_REQUIRED);
    }
}

pub fn check_cooking_time(cooking_time: i64, errors: &mut ValidationErrors) {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&cooking_time) {
        errors.add("cooking_time", ERR_COOKING_TIME_OUT_OF_RANGE);
    }
}

pub fn check_name(name: &str, errors: &mut ValidationErrors) {
    if name.trim().is_empty() {
        errors.add("name", ERR_FIELD_BLANK);
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.add("name", ERR_NAME_TOO_LONG);
    }
}

pub fn check_text(text: &str, errors: &mut ValidationErrors) {
    if text.trim().is_empty() {
        errors.add("text", ERR_FIELD_BLANK);
    }
}

pub fn check_image(image: &str, errors: &mut ValidationErrors) {
    if image.is_empty() {
        errors.add("image", ERR_FIELD_REQUIRED);
    }
}

/// Every rule a new recipe must satisfy before anything is written
pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_name(&recipe.name, &mut errors);
    check_text(&recipe.text, &mut errors);
    check_cooking_time(recipe.cooking_time, &mut errors);
    check_image(&recipe.image, &mut errors);
    check_ingredients(&recipe.ingredients, &mut errors);
    check_tags(&recipe.tags, &mut errors);
    errors.into_result()
}

/// Same rules as creation, applied to the fields that are present
pub fn validate_recipe_update(update: &RecipeUpdate) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if let Some(name) = &update.name {
        check_name(name, &mut errors);
    }
    if let Some(text) = &update.text {
        check_text(text, &mut errors);
    }
    if let Some(cooking_time) = update.cooking_time {
        check_cooking_time(cooking_time, &mut errors);
    }
    if let Some(image) = &update.image {
        check_image(image, &mut errors);
    }
    if let Some(ingredients) = &update.ingredients {
        check_ingredients(ingredients, &mut errors);
    }
    if let Some(tags) = &update.tags {
        check_tags(tags, &mut errors);
    }
    errors.into_result()
}

/// Tag ids with duplicates dropped, first occurrence wins
pub fn dedup_tags(tags: &[u64]) -> Vec<u64> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Nobody may follow themselves
pub fn ensure_not_self(actor: u64, target: u64) -> Result<()> {
    if actor == target {
        tracing::warn!("User {} attempted to subscribe to themselves", actor);
        return Err(AppError::InvalidOperation(ERR_SELF_SUBSCRIPTION.to_string()));
    }
    Ok(())
}

/// Only the author may edit or delete a recipe
pub fn ensure_author(recipe: &RecipeRecord, actor: u64) -> Result<()> {
    if recipe.author != Some(actor) {
        tracing::warn!("User {} is not the author of the recipe", actor);
        return Err(AppError::Forbidden);
    }
    Ok(())
}
