pub mod actor;
pub mod health;
pub mod payload;
pub mod recipes;
pub mod reference;
pub mod relations;
pub mod shopping;
pub mod users;

pub use actor::{Actor, MaybeActor};
pub use health::health_check;
pub use payload::Payload;
pub use recipes::{create_recipe, delete_recipe, get_recipe, list_recipes, update_recipe};
pub use reference::{get_ingredient, get_tag, list_ingredients, list_tags};
pub use relations::{
    add_favorite, add_to_cart, list_subscriptions, remove_favorite, remove_from_cart, subscribe,
    unsubscribe,
};
pub use shopping::{download_shopping_cart, shopping_list};
pub use users::get_user;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Every API route, without transport layers (CORS, tracing)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/ingredients", get(list_ingredients))
        .route("/api/ingredients/:id", get(get_ingredient))
        .route("/api/tags", get(list_tags))
        .route("/api/tags/:id", get(get_tag))
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route("/api/recipes/shopping_list", get(shopping_list))
        .route(
            "/api/recipes/download_shopping_cart",
            get(download_shopping_cart),
        )
        .route(
            "/api/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route(
            "/api/recipes/:id/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/:id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
        .route("/api/users/subscriptions", get(list_subscriptions))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id/subscribe", post(subscribe).delete(unsubscribe))
        .with_state(state)
}
