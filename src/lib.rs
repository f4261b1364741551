//! Recipebook Server Library
//!
//! Recipe composition, user relations and shopping-list consolidation over an
//! embedded redb store, exposed through an axum router.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod media;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use db::{open_database, Db};
pub use error::{AppError, Result};

use std::sync::Arc;

use media::{FsImageStore, ImageStore};
use services::{
    Catalog, FavoriteService, PlainTextRenderer, RecipeCompositionEngine, ShoppingCartService,
    ShoppingListAggregator, ShoppingListRenderer, SubscriptionService, Users,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Config,
    pub catalog: Catalog,
    pub users: Users,
    pub recipes: RecipeCompositionEngine,
    pub favorites: FavoriteService,
    pub cart: ShoppingCartService,
    pub subscriptions: SubscriptionService,
    pub shopping: ShoppingListAggregator,
    pub renderer: Arc<dyn ShoppingListRenderer>,
}

impl AppState {
    /// State with the filesystem image store under `config.media_root` and
    /// the plain-text shopping list renderer
    pub fn new(db: Db, config: Config) -> Self {
        let images = Arc::new(FsImageStore::new(config.media_root.clone()));
        Self::with_collaborators(db, config, images, Arc::new(PlainTextRenderer))
    }

    pub fn with_collaborators(
        db: Db,
        config: Config,
        images: Arc<dyn ImageStore>,
        renderer: Arc<dyn ShoppingListRenderer>,
    ) -> Self {
        Self {
            catalog: Catalog::new(db.clone()),
            users: Users::new(db.clone()),
            recipes: RecipeCompositionEngine::new(db.clone(), images),
            favorites: FavoriteService::new(db.clone()),
            cart: ShoppingCartService::new(db.clone()),
            subscriptions: SubscriptionService::new(db.clone()),
            shopping: ShoppingListAggregator::new(db.clone()),
            renderer,
            db,
            config,
        }
    }
}
