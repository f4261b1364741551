//! Read-model builders shared by the services.
//!
//! Everything here is generic over [`Snapshot`], so the same code serves plain
//! reads and the response of a write that has not committed yet. Callers must
//! not hold a table open for writing while calling into this module.

use redb::{ReadableTable, TableDefinition, Value};

use crate::db::{read_all, read_record, tables, Snapshot};
use crate::error::Result;
use crate::models::{
    timestamp_to_rfc3339, IngredientRecord, Profile, RecipeIngredientView, RecipeRecord,
    RecipeView, ShortRecipe, SubscriptionView, Tag, TagRecord, UserRecord,
};

/// Whether the pair `(first, second)` exists in a relation table
pub fn has_pair<S: Snapshot, V: Value + 'static>(
    snapshot: &S,
    definition: TableDefinition<(u64, u64), V>,
    first: u64,
    second: u64,
) -> Result<bool> {
    let table = snapshot.table(definition)?;
    let found = table.get((first, second))?.is_some();
    Ok(found)
}

/// Like [`has_pair`], but anonymous viewers are never related to anything
pub fn viewer_has_pair<S: Snapshot, V: Value + 'static>(
    snapshot: &S,
    definition: TableDefinition<(u64, u64), V>,
    viewer: Option<u64>,
    second: u64,
) -> Result<bool> {
    match viewer {
        Some(viewer) => has_pair(snapshot, definition, viewer, second),
        None => Ok(false),
    }
}

pub fn load_user<S: Snapshot>(snapshot: &S, id: u64) -> Result<Option<UserRecord>> {
    let users = snapshot.table(tables::USERS)?;
    read_record(&users, id)
}

pub fn load_recipe<S: Snapshot>(snapshot: &S, id: u64) -> Result<Option<RecipeRecord>> {
    let recipes = snapshot.table(tables::RECIPES)?;
    read_record(&recipes, id)
}

pub fn profile<S: Snapshot>(snapshot: &S, viewer: Option<u64>, id: u64) -> Result<Option<Profile>> {
    let Some(record) = load_user(snapshot, id)? else {
        return Ok(None);
    };
    let is_subscribed = viewer_has_pair(snapshot, tables::SUBSCRIPTIONS, viewer, id)?;
    Ok(Some(Profile::from_record(id, record, is_subscribed)))
}

/// Ingredient lines of a recipe in the order they were submitted
pub fn recipe_ingredients<S: Snapshot>(
    snapshot: &S,
    recipe_id: u64,
) -> Result<Vec<RecipeIngredientView>> {
    let mut rows = {
        let recipe_ingredients = snapshot.table(tables::RECIPE_INGREDIENTS)?;
        let mut rows = Vec::new();
        for entry in recipe_ingredients.range(crate::db::pair_prefix(recipe_id))? {
            let (key, value) = entry?;
            let (_, ingredient_id) = key.value();
            let (position, amount) = value.value();
            rows.push((position, ingredient_id, amount));
        }
        rows
    };

    let ingredients = snapshot.table(tables::INGREDIENTS)?;
    rows.sort_unstable();
    let mut lines = Vec::with_capacity(rows.len());
    for (_, ingredient_id, amount) in rows {
        match read_record::<IngredientRecord>(&ingredients, ingredient_id)? {
            Some(ingredient) => lines.push(RecipeIngredientView {
                id: ingredient_id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount,
            }),
            None => tracing::warn!(
                "Recipe {} references missing ingredient {}",
                recipe_id,
                ingredient_id
            ),
        }
    }
    Ok(lines)
}

/// Tags of a recipe ordered by name
pub fn recipe_tags<S: Snapshot>(snapshot: &S, recipe_id: u64) -> Result<Vec<Tag>> {
    let tag_ids = {
        let recipe_tags = snapshot.table(tables::RECIPE_TAGS)?;
        crate::db::pair_seconds(&recipe_tags, recipe_id)?
    };

    let tags_table = snapshot.table(tables::TAGS)?;
    let mut tags = Vec::with_capacity(tag_ids.len());
    for tag_id in tag_ids {
        if let Some(record) = read_record::<TagRecord>(&tags_table, tag_id)? {
            tags.push(Tag::from_record(tag_id, record));
        }
    }
    tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(tags)
}

/// Full recipe view as seen by `viewer`
pub fn recipe_view<S: Snapshot>(
    snapshot: &S,
    viewer: Option<u64>,
    id: u64,
) -> Result<Option<RecipeView>> {
    let Some(record) = load_recipe(snapshot, id)? else {
        return Ok(None);
    };

    let author = match record.author {
        Some(author_id) => profile(snapshot, viewer, author_id)?,
        None => None,
    };

    Ok(Some(RecipeView {
        id,
        author,
        ingredients: recipe_ingredients(snapshot, id)?,
        tags: recipe_tags(snapshot, id)?,
        is_favorited: viewer_has_pair(snapshot, tables::FAVORITES, viewer, id)?,
        is_in_shopping_cart: viewer_has_pair(snapshot, tables::SHOPPING_CART, viewer, id)?,
        created_at: timestamp_to_rfc3339(record.created_at),
        name: record.name,
        text: record.text,
        cooking_time: record.cooking_time,
        image: record.image,
    }))
}

/// Recipes written by `author`, newest first
pub fn recipes_by_author<S: Snapshot>(snapshot: &S, author: u64) -> Result<Vec<ShortRecipe>> {
    let recipes = snapshot.table(tables::RECIPES)?;
    let mut short: Vec<ShortRecipe> = read_all::<RecipeRecord>(&recipes)?
        .into_iter()
        .filter(|(_, record)| record.author == Some(author))
        .map(|(id, record)| ShortRecipe::from_record(id, &record))
        .collect();
    short.reverse();
    Ok(short)
}

/// Profile of a followed user with up to `recipes_limit` of their recipes
///
/// Only ever built for a pair that exists, so `is_subscribed` is always true.
pub fn subscription_view<S: Snapshot>(
    snapshot: &S,
    target: u64,
    recipes_limit: Option<usize>,
) -> Result<Option<SubscriptionView>> {
    let Some(record) = load_user(snapshot, target)? else {
        return Ok(None);
    };

    let mut recipes = recipes_by_author(snapshot, target)?;
    let recipes_count = recipes.len() as u64;
    if let Some(limit) = recipes_limit {
        recipes.truncate(limit);
    }

    Ok(Some(SubscriptionView {
        profile: Profile::from_record(target, record, true),
        recipes,
        recipes_count,
    }))
}
