//! Recipe composition: a recipe, its ordered ingredient amounts and its tag set
//! are written together in one transaction or not at all.

use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{
    ERR_AMOUNT_OUT_OF_RANGE, ERR_INGREDIENTS_DUPLICATED, MAX_INGREDIENT_AMOUNT,
    MIN_INGREDIENT_AMOUNT,
};
use crate::db::{
    next_id, pair_seconds, read_all, read_record, remove_pairs_with_first,
    remove_pairs_with_second, tables, write_record, Db,
};
use crate::error::{AppError, Result, ValidationErrors};
use crate::media::{decode_image, ImageStore};
use crate::models::{
    IngredientAmount, NewRecipe, RecipeFilter, RecipeRecord, RecipeUpdate, RecipeView, TagRecord,
};
use crate::services::validation::{
    dedup_tags, ensure_author, validate_new_recipe, validate_recipe_update,
};
use crate::services::{projections, require_actor};

#[derive(Clone)]
pub struct RecipeCompositionEngine {
    db: Db,
    images: Arc<dyn ImageStore>,
}

impl RecipeCompositionEngine {
    pub fn new(db: Db, images: Arc<dyn ImageStore>) -> Self {
        Self { db, images }
    }

    /// Create a recipe with its ingredient amounts and tags
    ///
    /// Input rules are checked before anything is written. Unknown ingredient or
    /// tag ids are rejected inside the write transaction, so a failure at any
    /// point leaves no recipe behind.
    pub fn create(&self, actor: u64, recipe: NewRecipe) -> Result<RecipeView> {
        validate_new_recipe(&recipe)?;
        let tags = dedup_tags(&recipe.tags);
        let image = self.images.store(&decode_image(&recipe.image)?)?;

        let write_txn = self.db.begin_write()?;
        require_actor(&write_txn, actor)?;
        check_references(
            &write_txn,
            Some(recipe.ingredients.as_slice()),
            Some(tags.as_slice()),
        )?;

        let id = next_id(&write_txn, "recipes")?;
        let record = RecipeRecord {
            author: Some(actor),
            name: recipe.name.trim().to_string(),
            text: recipe.text,
            cooking_time: recipe.cooking_time as u32,
            image,
            created_at: Utc::now().timestamp(),
        };
        {
            let mut recipes = write_txn.open_table(tables::RECIPES)?;
            write_record(&mut recipes, id, &record)?;
        }
        insert_ingredients(&write_txn, id, &recipe.ingredients)?;
        insert_tags(&write_txn, id, &tags)?;

        let view = projections::recipe_view(&write_txn, Some(actor), id)?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
        write_txn.commit()?;

        tracing::info!(
            "Recipe {} created by user {} with {} ingredients and {} tags",
            id,
            actor,
            view.ingredients.len(),
            view.tags.len()
        );
        Ok(view)
    }

    /// Update a recipe
    ///
    /// Omitted fields are left unchanged. A supplied ingredient list or tag set
    /// replaces the stored one entirely.
    pub fn update(&self, actor: u64, id: u64, update: RecipeUpdate) -> Result<RecipeView> {
        // Early answer for missing recipes and foreign authors; re-checked below
        {
            let read_txn = self.db.begin_read()?;
            let recipe = projections::load_recipe(&read_txn, id)?
                .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
            ensure_author(&recipe, actor)?;
        }

        validate_recipe_update(&update)?;
        let tags = update.tags.as_deref().map(dedup_tags);
        let image = match &update.image {
            Some(payload) => Some(self.images.store(&decode_image(payload)?)?),
            None => None,
        };

        let write_txn = self.db.begin_write()?;
        require_actor(&write_txn, actor)?;
        let mut record = projections::load_recipe(&write_txn, id)?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
        ensure_author(&record, actor)?;
        check_references(&write_txn, update.ingredients.as_deref(), tags.as_deref())?;

        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(text) = update.text {
            record.text = text;
        }
        if let Some(cooking_time) = update.cooking_time {
            record.cooking_time = cooking_time as u32;
        }
        if let Some(image) = image {
            record.image = image;
        }
        {
            let mut recipes = write_txn.open_table(tables::RECIPES)?;
            write_record(&mut recipes, id, &record)?;
        }

        if let Some(ingredients) = &update.ingredients {
            {
                let mut recipe_ingredients = write_txn.open_table(tables::RECIPE_INGREDIENTS)?;
                remove_pairs_with_first(&mut recipe_ingredients, id)?;
            }
            insert_ingredients(&write_txn, id, ingredients)?;
        }
        if let Some(tags) = &tags {
            {
                let mut recipe_tags = write_txn.open_table(tables::RECIPE_TAGS)?;
                remove_pairs_with_first(&mut recipe_tags, id)?;
            }
            insert_tags(&write_txn, id, tags)?;
        }

        let view = projections::recipe_view(&write_txn, Some(actor), id)?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
        write_txn.commit()?;

        tracing::info!("Recipe {} updated by user {}", id, actor);
        Ok(view)
    }

    /// Delete a recipe together with its ingredient rows, tag links,
    /// favorites and cart entries
    pub fn delete(&self, actor: u64, id: u64) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        require_actor(&write_txn, actor)?;
        {
            let mut recipes = write_txn.open_table(tables::RECIPES)?;
            let record: RecipeRecord = read_record(&recipes, id)?
                .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;
            ensure_author(&record, actor)?;
            recipes.remove(id)?;

            let mut recipe_ingredients = write_txn.open_table(tables::RECIPE_INGREDIENTS)?;
            remove_pairs_with_first(&mut recipe_ingredients, id)?;
            let mut recipe_tags = write_txn.open_table(tables::RECIPE_TAGS)?;
            remove_pairs_with_first(&mut recipe_tags, id)?;

            let mut favorites = write_txn.open_table(tables::FAVORITES)?;
            remove_pairs_with_second(&mut favorites, id)?;
            let mut cart = write_txn.open_table(tables::SHOPPING_CART)?;
            remove_pairs_with_second(&mut cart, id)?;
        }
        write_txn.commit()?;

        tracing::info!("Recipe {} deleted by user {}", id, actor);
        Ok(())
    }

    pub fn get(&self, viewer: Option<u64>, id: u64) -> Result<RecipeView> {
        let read_txn = self.db.begin_read()?;
        projections::recipe_view(&read_txn, viewer, id)?
            .ok_or_else(|| AppError::NotFound("Recipe".to_string()))
    }

    /// Recipes matching `filter`, newest first
    ///
    /// Favorite and cart filters only apply to an identified viewer.
    pub fn list(&self, viewer: Option<u64>, filter: &RecipeFilter) -> Result<Vec<RecipeView>> {
        let read_txn = self.db.begin_read()?;

        let ids = {
            let recipes = read_txn.open_table(tables::RECIPES)?;
            let mut candidates: Vec<(u64, RecipeRecord)> = read_all(&recipes)?;
            candidates.reverse();

            let wanted_tags: Option<HashSet<u64>> = if filter.tags.is_empty() {
                None
            } else {
                let tags = read_txn.open_table(tables::TAGS)?;
                Some(
                    read_all::<TagRecord>(&tags)?
                        .into_iter()
                        .filter(|(_, tag)| filter.tags.iter().any(|slug| *slug == tag.slug))
                        .map(|(id, _)| id)
                        .collect(),
                )
            };

            let recipe_tags = read_txn.open_table(tables::RECIPE_TAGS)?;
            let favorites = read_txn.open_table(tables::FAVORITES)?;
            let cart = read_txn.open_table(tables::SHOPPING_CART)?;

            let mut ids = Vec::new();
            for (id, record) in candidates {
                if let Some(author) = filter.author {
                    if record.author != Some(author) {
                        continue;
                    }
                }
                if let Some(wanted) = &wanted_tags {
                    let recipe_tag_ids = pair_seconds(&recipe_tags, id)?;
                    if !recipe_tag_ids.iter().any(|tag| wanted.contains(tag)) {
                        continue;
                    }
                }
                if let Some(viewer) = viewer {
                    if let Some(flag) = filter.is_favorited {
                        let present = favorites.get((viewer, id))?.is_some();
                        if present != flag {
                            continue;
                        }
                    }
                    if let Some(flag) = filter.is_in_shopping_cart {
                        let present = cart.get((viewer, id))?.is_some();
                        if present != flag {
                            continue;
                        }
                    }
                }
                ids.push(id);
            }
            ids
        };

        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(view) = projections::recipe_view(&read_txn, viewer, id)? {
                views.push(view);
            }
        }
        tracing::debug!("Listed {} recipes", views.len());
        Ok(views)
    }
}

/// Reject ingredient and tag ids that do not resolve to stored rows
fn check_references(
    write_txn: &WriteTransaction,
    ingredients: Option<&[IngredientAmount]>,
    tags: Option<&[u64]>,
) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if let Some(ingredients) = ingredients {
        let table = write_txn.open_table(tables::INGREDIENTS)?;
        for entry in ingredients {
            if table.get(entry.id)?.is_none() {
                errors.add("ingredients", format!("Unknown ingredient id {}", entry.id));
            }
        }
    }
    if let Some(tags) = tags {
        let table = write_txn.open_table(tables::TAGS)?;
        for tag in tags {
            if table.get(*tag)?.is_none() {
                errors.add("tags", format!("Unknown tag id {}", tag));
            }
        }
    }

    if !errors.is_empty() {
        tracing::warn!("Recipe references rejected: {}", errors);
    }
    errors.into_result()
}

/// Insert the `(recipe, ingredient)` rows in submission order
///
/// The pair key and the amount bounds are enforced here as well; a violation
/// returns before commit, which discards every row of the transaction.
fn insert_ingredients(
    write_txn: &WriteTransaction,
    recipe_id: u64,
    ingredients: &[IngredientAmount],
) -> Result<()> {
    let mut table = write_txn.open_table(tables::RECIPE_INGREDIENTS)?;
    for (position, entry) in ingredients.iter().enumerate() {
        if !(MIN_INGREDIENT_AMOUNT..=MAX_INGREDIENT_AMOUNT).contains(&entry.amount) {
            return Err(AppError::Validation(ValidationErrors::single(
                "ingredients",
                ERR_AMOUNT_OUT_OF_RANGE,
            )));
        }
        let previous = table
            .insert((recipe_id, entry.id), (position as u32, entry.amount as u32))?
            .is_some();
        if previous {
            return Err(AppError::Validation(ValidationErrors::single(
                "ingredients",
                ERR_INGREDIENTS_DUPLICATED,
            )));
        }
    }
    Ok(())
}

fn insert_tags(write_txn: &WriteTransaction, recipe_id: u64, tags: &[u64]) -> Result<()> {
    let mut table = write_txn.open_table(tables::RECIPE_TAGS)?;
    for tag in tags {
        table.insert((recipe_id, *tag), ())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestEnv;

    fn new_recipe(ingredients: Vec<IngredientAmount>, tags: Vec<u64>) -> NewRecipe {
        NewRecipe {
            name: "Pancakes".to_string(),
            text: "Mix and fry".to_string(),
            cooking_time: 20,
            image: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            ingredients,
            tags,
        }
    }

    fn recipe_count(env: &TestEnv) -> usize {
        env.engine().list(None, &RecipeFilter::default()).unwrap().len()
    }

    #[test]
    fn test_create_stores_exact_ingredients_and_tags() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let flour = env.ingredient("Flour", "g");
        let milk = env.ingredient("Milk", "ml");
        let eggs = env.ingredient("Eggs", "pcs");
        let breakfast = env.tag("Breakfast", "breakfast");
        let sweet = env.tag("Sweet", "sweet");

        let view = env
            .engine()
            .create(
                ada,
                new_recipe(
                    vec![
                        IngredientAmount::new(milk, 300),
                        IngredientAmount::new(flour, 200),
                        IngredientAmount::new(eggs, 2),
                    ],
                    vec![sweet, breakfast, sweet],
                ),
            )
            .unwrap();

        let lines: Vec<(u64, u32)> = view.ingredients.iter().map(|i| (i.id, i.amount)).collect();
        assert_eq!(lines, vec![(milk, 300), (flour, 200), (eggs, 2)]);
        assert_eq!(view.ingredients[0].measurement_unit, "ml");

        let tag_ids: HashSet<u64> = view.tags.iter().map(|t| t.id).collect();
        assert_eq!(tag_ids, HashSet::from([breakfast, sweet]));
        assert_eq!(view.tags.len(), 2);

        assert_eq!(view.author.as_ref().map(|a| a.id), Some(ada));
        assert!(view.image.starts_with("recipes/"));
        assert!(!view.is_favorited);

        let stored = env.engine().get(None, view.id).unwrap();
        assert_eq!(stored, RecipeView { is_favorited: false, is_in_shopping_cart: false, ..view });
    }

    #[test]
    fn test_create_rejects_invalid_input_without_writing() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let salt = env.ingredient("Salt", "g");
        let tag = env.tag("Dinner", "dinner");

        let cases = vec![
            (new_recipe(vec![], vec![tag]), "ingredients"),
            (new_recipe(vec![IngredientAmount::new(salt, 5)], vec![]), "tags"),
            (
                new_recipe(
                    vec![IngredientAmount::new(salt, 5), IngredientAmount::new(salt, 7)],
                    vec![tag],
                ),
                "ingredients",
            ),
            (new_recipe(vec![IngredientAmount::new(salt, 0)], vec![tag]), "ingredients"),
            (
                new_recipe(vec![IngredientAmount::new(salt, 200_001)], vec![tag]),
                "ingredients",
            ),
            (new_recipe(vec![IngredientAmount::new(999, 5)], vec![tag]), "ingredients"),
            (new_recipe(vec![IngredientAmount::new(salt, 5)], vec![tag, 999]), "tags"),
        ];

        for (recipe, field) in cases {
            let err = env.engine().create(ada, recipe).unwrap_err();
            assert!(
                err.validation_errors().unwrap().contains(field),
                "expected a {} error, got {:?}",
                field,
                err
            );
        }

        assert_eq!(recipe_count(&env), 0);
    }

    #[test]
    fn test_data_url_image_is_stored_decoded() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let salt = env.ingredient("Salt", "g");
        let tag = env.tag("Dinner", "dinner");

        let view = env
            .engine()
            .create(
                ada,
                new_recipe(vec![IngredientAmount::new(salt, 5)], vec![tag]),
            )
            .unwrap();
        let stored = std::fs::read(env.images.resolve(&view.image)).unwrap();
        assert_eq!(stored, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);

        let mut broken = new_recipe(vec![IngredientAmount::new(salt, 5)], vec![tag]);
        broken.image = "data:image/png;base64,%%%".to_string();
        let err = env.engine().create(ada, broken).unwrap_err();
        assert!(err.validation_errors().unwrap().contains("image"));
        assert_eq!(recipe_count(&env), 1);
    }

    #[test]
    fn test_amount_bounds_are_inclusive() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let salt = env.ingredient("Salt", "g");
        let pepper = env.ingredient("Pepper", "g");
        let tag = env.tag("Dinner", "dinner");

        let view = env
            .engine()
            .create(
                ada,
                new_recipe(
                    vec![
                        IngredientAmount::new(salt, 1),
                        IngredientAmount::new(pepper, 200_000),
                    ],
                    vec![tag],
                ),
            )
            .unwrap();
        assert_eq!(view.ingredients[0].amount, 1);
        assert_eq!(view.ingredients[1].amount, 200_000);
    }

    #[test]
    fn test_failed_insert_rolls_back_every_row() {
        let env = TestEnv::new();
        let salt = env.ingredient("Salt", "g");
        let pepper = env.ingredient("Pepper", "g");
        let sugar = env.ingredient("Sugar", "g");

        // Bypass input validation so the third insert trips the store-side bound
        let write_txn = env.db.begin_write().unwrap();
        let id = next_id(&write_txn, "recipes").unwrap();
        let err = insert_ingredients(
            &write_txn,
            id,
            &[
                IngredientAmount::new(salt, 5),
                IngredientAmount::new(pepper, 6),
                IngredientAmount::new(sugar, 0),
            ],
        )
        .unwrap_err();
        assert!(err.validation_errors().unwrap().contains("ingredients"));
        drop(write_txn);

        let read_txn = env.db.begin_read().unwrap();
        let table = read_txn.open_table(tables::RECIPE_INGREDIENTS).unwrap();
        assert!(pair_seconds(&table, id).unwrap().is_empty());
    }

    #[test]
    fn test_update_replaces_ingredients() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let a = env.ingredient("Apple", "pcs");
        let b = env.ingredient("Banana", "pcs");
        let tag = env.tag("Fruit", "fruit");
        let recipe = env.recipe(ada, &[(a, 3)], &[tag]);

        let update = RecipeUpdate {
            ingredients: Some(vec![IngredientAmount::new(b, 4)]),
            ..Default::default()
        };
        env.engine().update(ada, recipe, update).unwrap();

        let view = env.engine().get(None, recipe).unwrap();
        let lines: Vec<(u64, u32)> = view.ingredients.iter().map(|i| (i.id, i.amount)).collect();
        assert_eq!(lines, vec![(b, 4)]);
        assert_eq!(view.tags.len(), 1);
    }

    #[test]
    fn test_update_without_lists_keeps_them() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let a = env.ingredient("Apple", "pcs");
        let fruit = env.tag("Fruit", "fruit");
        let snack = env.tag("Snack", "snack");
        let recipe = env.recipe(ada, &[(a, 3)], &[fruit]);

        let update = RecipeUpdate {
            name: Some("Apple slices".to_string()),
            cooking_time: Some(2),
            ..Default::default()
        };
        let view = env.engine().update(ada, recipe, update).unwrap();
        assert_eq!(view.name, "Apple slices");
        assert_eq!(view.cooking_time, 2);
        assert_eq!(view.ingredients.len(), 1);
        assert_eq!(view.tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![fruit]);

        let update = RecipeUpdate {
            tags: Some(vec![snack]),
            ..Default::default()
        };
        let view = env.engine().update(ada, recipe, update).unwrap();
        assert_eq!(view.tags.iter().map(|t| t.id).collect::<Vec<_>>(), vec![snack]);
    }

    #[test]
    fn test_update_errors() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let bob = env.user("bob");
        let a = env.ingredient("Apple", "pcs");
        let tag = env.tag("Fruit", "fruit");
        let recipe = env.recipe(ada, &[(a, 3)], &[tag]);

        let err = env
            .engine()
            .update(ada, 999, RecipeUpdate::default())
            .unwrap_err();
        assert!(err.is_not_found());

        let err = env
            .engine()
            .update(bob, recipe, RecipeUpdate::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let update = RecipeUpdate {
            ingredients: Some(vec![IngredientAmount::new(a, 0)]),
            ..Default::default()
        };
        let err = env.engine().update(ada, recipe, update).unwrap_err();
        assert!(err.validation_errors().unwrap().contains("ingredients"));

        // Nothing changed
        let view = env.engine().get(None, recipe).unwrap();
        assert_eq!(view.ingredients[0].amount, 3);
    }

    #[test]
    fn test_delete_cascades() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let bob = env.user("bob");
        let salt = env.ingredient("Salt", "g");
        let tag = env.tag("Dinner", "dinner");
        let recipe = env.recipe(ada, &[(salt, 10)], &[tag]);
        env.favorites().add(bob, recipe).unwrap();
        env.cart().add(bob, recipe).unwrap();

        assert!(matches!(
            env.engine().delete(bob, recipe),
            Err(AppError::Forbidden)
        ));
        env.engine().delete(ada, recipe).unwrap();

        assert!(env.engine().get(None, recipe).unwrap_err().is_not_found());
        assert!(env.favorites().targets(bob).unwrap().is_empty());
        assert!(env.aggregator().aggregate(bob).unwrap().is_empty());
        assert!(env.engine().delete(ada, recipe).unwrap_err().is_not_found());

        // Shared reference data survives
        assert_eq!(env.catalog().get_ingredient(salt).unwrap().name, "Salt");
        assert_eq!(env.catalog().get_tag(tag).unwrap().slug, "dinner");
    }

    #[test]
    fn test_list_filters() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let bob = env.user("bob");
        let salt = env.ingredient("Salt", "g");
        let lunch = env.tag("Lunch", "lunch");
        let dinner = env.tag("Dinner", "dinner");
        let first = env.recipe(ada, &[(salt, 1)], &[lunch]);
        let second = env.recipe(bob, &[(salt, 2)], &[dinner]);
        let third = env.recipe(ada, &[(salt, 3)], &[lunch, dinner]);
        env.favorites().add(bob, first).unwrap();
        env.cart().add(bob, third).unwrap();

        let ids = |viewer: Option<u64>, filter: RecipeFilter| -> Vec<u64> {
            env.engine()
                .list(viewer, &filter)
                .unwrap()
                .into_iter()
                .map(|r| r.id)
                .collect()
        };

        assert_eq!(ids(None, RecipeFilter::default()), vec![third, second, first]);
        assert_eq!(
            ids(
                None,
                RecipeFilter {
                    author: Some(ada),
                    ..Default::default()
                }
            ),
            vec![third, first]
        );
        assert_eq!(
            ids(
                None,
                RecipeFilter {
                    tags: vec!["dinner".to_string()],
                    ..Default::default()
                }
            ),
            vec![third, second]
        );
        assert_eq!(
            ids(
                Some(bob),
                RecipeFilter {
                    is_favorited: Some(true),
                    ..Default::default()
                }
            ),
            vec![first]
        );
        assert_eq!(
            ids(
                Some(bob),
                RecipeFilter {
                    is_in_shopping_cart: Some(false),
                    ..Default::default()
                }
            ),
            vec![second, first]
        );
        // Relation filters are ignored for anonymous viewers
        assert_eq!(
            ids(
                None,
                RecipeFilter {
                    is_favorited: Some(true),
                    ..Default::default()
                }
            )
            .len(),
            3
        );

        let views = env.engine().list(Some(bob), &RecipeFilter::default()).unwrap();
        assert!(views.iter().any(|v| v.id == first && v.is_favorited));
        assert!(views.iter().any(|v| v.id == third && v.is_in_shopping_cart));
    }
}
