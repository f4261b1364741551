//! Favorite, shopping-cart and subscription toggles.
//!
//! Adds answer 201 with the target's projection, removes answer 204.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{ShortRecipe, SubscriptionView};
use crate::routes::Actor;
use crate::AppState;

pub async fn add_favorite(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(recipe): Path<u64>,
) -> Result<(StatusCode, Json<ShortRecipe>)> {
    let favorites = state.favorites.clone();
    let short = tokio::task::spawn_blocking(move || favorites.add(actor, recipe)).await??;
    Ok((StatusCode::CREATED, Json(short)))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(recipe): Path<u64>,
) -> Result<StatusCode> {
    let favorites = state.favorites.clone();
    tokio::task::spawn_blocking(move || favorites.remove(actor, recipe)).await??;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(recipe): Path<u64>,
) -> Result<(StatusCode, Json<ShortRecipe>)> {
    let cart = state.cart.clone();
    let short = tokio::task::spawn_blocking(move || cart.add(actor, recipe)).await??;
    Ok((StatusCode::CREATED, Json(short)))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(recipe): Path<u64>,
) -> Result<StatusCode> {
    let cart = state.cart.clone();
    tokio::task::spawn_blocking(move || cart.remove(actor, recipe)).await??;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn subscribe(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(author): Path<u64>,
) -> Result<(StatusCode, Json<SubscriptionView>)> {
    let subscriptions = state.subscriptions.clone();
    let view = tokio::task::spawn_blocking(move || subscriptions.add(actor, author)).await??;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(author): Path<u64>,
) -> Result<StatusCode> {
    let subscriptions = state.subscriptions.clone();
    tokio::task::spawn_blocking(move || subscriptions.remove(actor, author)).await??;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionParams {
    pub recipes_limit: Option<usize>,
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Query(params): Query<SubscriptionParams>,
) -> Result<Json<Vec<SubscriptionView>>> {
    let subscriptions = state.subscriptions.clone();
    let views =
        tokio::task::spawn_blocking(move || subscriptions.list(actor, params.recipes_limit))
            .await??;
    Ok(Json(views))
}
