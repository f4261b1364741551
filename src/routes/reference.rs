//! Read-only endpoints over ingredients and tags.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Ingredient, Tag};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientParams {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(params): Query<IngredientParams>,
) -> Result<Json<Vec<Ingredient>>> {
    let catalog = state.catalog.clone();
    let ingredients =
        tokio::task::spawn_blocking(move || catalog.list_ingredients(params.name.as_deref()))
            .await??;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Ingredient>> {
    let catalog = state.catalog.clone();
    let ingredient = tokio::task::spawn_blocking(move || catalog.get_ingredient(id)).await??;
    Ok(Json(ingredient))
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    let catalog = state.catalog.clone();
    let tags = tokio::task::spawn_blocking(move || catalog.list_tags()).await??;
    Ok(Json(tags))
}

pub async fn get_tag(State(state): State<AppState>, Path(id): Path<u64>) -> Result<Json<Tag>> {
    let catalog = state.catalog.clone();
    let tag = tokio::task::spawn_blocking(move || catalog.get_tag(id)).await??;
    Ok(Json(tag))
}
