//! Strict-once add / ordinary remove of user-scoped relations.
//!
//! Favorites, shopping-cart entries and subscriptions share one implementation,
//! [`RelationToggleService`], instantiated per [`RelationKind`]. Adding a pair
//! that already exists is a client error; removing a pair that does not exist
//! is `NotFound`.

use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::marker::PhantomData;

use crate::db::{pair_seconds, tables, Db};
use crate::error::{AppError, Result};
use crate::models::{ShortRecipe, SubscriptionView};
use crate::services::{projections, require_actor};
use crate::services::validation::ensure_not_self;

/// A user-scoped relation stored as `(actor, target) -> created_at`
pub trait RelationKind: Send + Sync + 'static {
    /// Pair table backing the relation
    const TABLE: TableDefinition<'static, (u64, u64), i64>;

    /// Entity name used when the relation row is missing
    const ENTRY: &'static str;

    /// Message returned when the pair already exists
    const ALREADY_RELATED: &'static str;

    /// What a successful add returns
    type Projection;

    /// Pure predicate on the pair, evaluated before the store is touched
    fn guard(_actor: u64, _target: u64) -> Result<()> {
        Ok(())
    }

    /// Target existence, evaluated inside the mutating transaction
    fn check_target(write_txn: &WriteTransaction, actor: u64, target: u64) -> Result<()>;

    fn project(write_txn: &WriteTransaction, actor: u64, target: u64) -> Result<Self::Projection>;
}

fn require_recipe(write_txn: &WriteTransaction, recipe: u64) -> Result<()> {
    match projections::load_recipe(write_txn, recipe)? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound("Recipe".to_string())),
    }
}

fn short_recipe(write_txn: &WriteTransaction, recipe: u64) -> Result<ShortRecipe> {
    projections::load_recipe(write_txn, recipe)?
        .map(|record| ShortRecipe::from_record(recipe, &record))
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))
}

/// User ↔ recipe bookmark
pub struct Favorite;

impl RelationKind for Favorite {
    const TABLE: TableDefinition<'static, (u64, u64), i64> = tables::FAVORITES;
    const ENTRY: &'static str = "Favorite";
    const ALREADY_RELATED: &'static str = "Recipe is already in favorites";
    type Projection = ShortRecipe;

    fn check_target(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<()> {
        require_recipe(write_txn, target)
    }

    fn project(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<ShortRecipe> {
        short_recipe(write_txn, target)
    }
}

/// User ↔ recipe entry feeding the shopping list
pub struct ShoppingCart;

impl RelationKind for ShoppingCart {
    const TABLE: TableDefinition<'static, (u64, u64), i64> = tables::SHOPPING_CART;
    const ENTRY: &'static str = "Shopping cart entry";
    const ALREADY_RELATED: &'static str = "Recipe is already in the shopping cart";
    type Projection = ShortRecipe;

    fn check_target(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<()> {
        require_recipe(write_txn, target)
    }

    fn project(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<ShortRecipe> {
        short_recipe(write_txn, target)
    }
}

/// Directed follow relation between two users
pub struct Subscription;

impl RelationKind for Subscription {
    const TABLE: TableDefinition<'static, (u64, u64), i64> = tables::SUBSCRIPTIONS;
    const ENTRY: &'static str = "Subscription";
    const ALREADY_RELATED: &'static str = "You are already subscribed to this user";
    type Projection = SubscriptionView;

    fn guard(actor: u64, target: u64) -> Result<()> {
        ensure_not_self(actor, target)
    }

    fn check_target(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<()> {
        match projections::load_user(write_txn, target)? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("User".to_string())),
        }
    }

    fn project(write_txn: &WriteTransaction, _actor: u64, target: u64) -> Result<SubscriptionView> {
        projections::subscription_view(write_txn, target, None)?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }
}

pub struct RelationToggleService<K: RelationKind> {
    db: Db,
    _kind: PhantomData<K>,
}

impl<K: RelationKind> Clone for RelationToggleService<K> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

pub type FavoriteService = RelationToggleService<Favorite>;
pub type ShoppingCartService = RelationToggleService<ShoppingCart>;
pub type SubscriptionService = RelationToggleService<Subscription>;

impl<K: RelationKind> RelationToggleService<K> {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }

    /// Create the `(actor, target)` pair; fails with `Conflict` if it already exists
    ///
    /// redb admits a single writer, so of two concurrent adds for the same pair
    /// the second one to run observes the first one's row and gets `Conflict`.
    pub fn add(&self, actor: u64, target: u64) -> Result<K::Projection> {
        K::guard(actor, target)?;
        let write_txn = self.db.begin_write()?;
        require_actor(&write_txn, actor)?;
        K::check_target(&write_txn, actor, target)?;
        {
            let mut table = write_txn.open_table(K::TABLE)?;
            if table.get((actor, target))?.is_some() {
                tracing::warn!(
                    "{} ({}, {}) already exists",
                    K::ENTRY,
                    actor,
                    target
                );
                return Err(AppError::Conflict(K::ALREADY_RELATED.to_string()));
            }
            table.insert((actor, target), Utc::now().timestamp())?;
        }
        let projection = K::project(&write_txn, actor, target)?;
        write_txn.commit()?;

        tracing::info!("{} ({}, {}) created", K::ENTRY, actor, target);
        Ok(projection)
    }

    /// Delete the `(actor, target)` pair; fails with `NotFound` if it is absent
    pub fn remove(&self, actor: u64, target: u64) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(K::TABLE)?;
            let removed = table.remove((actor, target))?.is_some();
            if !removed {
                tracing::warn!("{} ({}, {}) does not exist", K::ENTRY, actor, target);
                return Err(AppError::NotFound(K::ENTRY.to_string()));
            }
        }
        write_txn.commit()?;

        tracing::info!("{} ({}, {}) removed", K::ENTRY, actor, target);
        Ok(())
    }

    pub fn contains(&self, actor: u64, target: u64) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        projections::has_pair(&read_txn, K::TABLE, actor, target)
    }

    /// Every target related to `actor`, in id order
    pub fn targets(&self, actor: u64) -> Result<Vec<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(K::TABLE)?;
        pair_seconds(&table, actor)
    }
}

impl RelationToggleService<Subscription> {
    /// Authors `actor` follows, ordered by username, each with a recipe preview
    pub fn list(&self, actor: u64, recipes_limit: Option<usize>) -> Result<Vec<SubscriptionView>> {
        let read_txn = self.db.begin_read()?;
        require_actor(&read_txn, actor)?;

        let targets = {
            let table = read_txn.open_table(tables::SUBSCRIPTIONS)?;
            pair_seconds(&table, actor)?
        };

        let mut views = Vec::with_capacity(targets.len());
        for target in targets {
            if let Some(view) = projections::subscription_view(&read_txn, target, recipes_limit)? {
                views.push(view);
            }
        }
        views.sort_by(|a, b| a.profile.username.cmp(&b.profile.username));
        Ok(views)
    }
}
