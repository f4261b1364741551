use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::{Result, ValidationErrors};
use crate::models::{NewRecipe, RecipeFilter, RecipeUpdate, RecipeView};
use crate::routes::{Actor, MaybeActor, Payload};
use crate::AppState;

/// Build a [`RecipeFilter`] from raw query pairs
///
/// `tags` may repeat; boolean flags accept `1`/`0` and `true`/`false`.
pub fn parse_recipe_filter(pairs: &[(String, String)]) -> Result<RecipeFilter> {
    let mut filter = RecipeFilter::default();
    let mut errors = ValidationErrors::new();

    for (key, value) in pairs {
        match key.as_str() {
            "author" => match value.parse::<u64>() {
                Ok(author) => filter.author = Some(author),
                Err(_) => errors.add("author", "A valid integer is required"),
            },
            "tags" => filter.tags.push(value.clone()),
            "is_favorited" => match parse_flag(value) {
                Some(flag) => filter.is_favorited = Some(flag),
                None => errors.add("is_favorited", "Must be 0 or 1"),
            },
            "is_in_shopping_cart" => match parse_flag(value) {
                Some(flag) => filter.is_in_shopping_cart = Some(flag),
                None => errors.add("is_in_shopping_cart", "Must be 0 or 1"),
            },
            _ => {}
        }
    }

    errors.into_result()?;
    Ok(filter)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

pub async fn list_recipes(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<RecipeView>>> {
    let filter = parse_recipe_filter(&pairs)?;
    let engine = state.recipes.clone();
    let recipes = tokio::task::spawn_blocking(move || engine.list(viewer, &filter)).await??;
    Ok(Json(recipes))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Payload(payload): Payload<NewRecipe>,
) -> Result<(StatusCode, Json<RecipeView>)> {
    let engine = state.recipes.clone();
    let recipe = tokio::task::spawn_blocking(move || engine.create(actor, payload)).await??;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(id): Path<u64>,
) -> Result<Json<RecipeView>> {
    let engine = state.recipes.clone();
    let recipe = tokio::task::spawn_blocking(move || engine.get(viewer, id)).await??;
    Ok(Json(recipe))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<u64>,
    Payload(payload): Payload<RecipeUpdate>,
) -> Result<Json<RecipeView>> {
    let engine = state.recipes.clone();
    let recipe = tokio::task::spawn_blocking(move || engine.update(actor, id, payload)).await??;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(id): Path<u64>,
) -> Result<StatusCode> {
    let engine = state.recipes.clone();
    tokio::task::spawn_blocking(move || engine.delete(actor, id)).await??;
    Ok(StatusCode::NO_CONTENT)
}
