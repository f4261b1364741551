//! Synchronous domain services over the redb store.
//!
//! Every mutating operation runs in a single write transaction; handlers call
//! into these through `spawn_blocking`.

pub mod catalog;
pub mod projections;
pub mod recipes;
pub mod relations;
pub mod shopping;
pub mod users;
pub mod validation;

pub use catalog::Catalog;
pub use recipes::RecipeCompositionEngine;
pub use relations::{
    FavoriteService, RelationKind, RelationToggleService, ShoppingCartService,
    SubscriptionService,
};
pub use shopping::{PlainTextRenderer, ShoppingListAggregator, ShoppingListRenderer};
pub use users::Users;

use crate::db::Snapshot;
use crate::error::{AppError, Result};

/// The acting user must exist in the snapshot the operation runs against
pub(crate) fn require_actor<S: Snapshot>(snapshot: &S, actor: u64) -> Result<()> {
    match projections::load_user(snapshot, actor)? {
        Some(_) => Ok(()),
        None => {
            tracing::warn!("Rejected request from unknown user {}", actor);
            Err(AppError::Unauthorized)
        }
    }
}
