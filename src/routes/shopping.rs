use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::Result;
use crate::models::ShoppingListItem;
use crate::routes::Actor;
use crate::AppState;

/// Consolidated shopping list as JSON
pub async fn shopping_list(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Json<Vec<ShoppingListItem>>> {
    let aggregator = state.shopping.clone();
    let items = tokio::task::spawn_blocking(move || aggregator.aggregate(actor)).await??;
    Ok(Json(items))
}

/// Consolidated shopping list rendered as a downloadable document
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> Result<Response> {
    let aggregator = state.shopping.clone();
    let items = tokio::task::spawn_blocking(move || aggregator.aggregate(actor)).await??;

    let document = state.renderer.render(&items);
    tracing::info!(
        "Shopping list downloaded by user {} ({} lines)",
        actor,
        items.len()
    );

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.body,
    )
        .into_response())
}
