//! Shopping list consolidation across every recipe in a user's cart.

use std::collections::{BTreeMap, HashMap};

use redb::{ReadableDatabase, ReadableTable};

use crate::db::{pair_prefix, pair_seconds, read_record, tables, Db};
use crate::error::Result;
use crate::models::{IngredientRecord, RenderedDocument, ShoppingListItem};
use crate::services::require_actor;

#[derive(Clone)]
pub struct ShoppingListAggregator {
    db: Db,
}

impl ShoppingListAggregator {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Sum ingredient amounts over the actor's cart recipes
    ///
    /// Lines are grouped by exact (name, unit) and ordered by name, then unit.
    /// An empty cart yields an empty list.
    pub fn aggregate(&self, actor: u64) -> Result<Vec<ShoppingListItem>> {
        let read_txn = self.db.begin_read()?;
        require_actor(&read_txn, actor)?;

        let recipe_ids = {
            let cart = read_txn.open_table(tables::SHOPPING_CART)?;
            pair_seconds(&cart, actor)?
        };

        let recipe_ingredients = read_txn.open_table(tables::RECIPE_INGREDIENTS)?;
        let ingredients = read_txn.open_table(tables::INGREDIENTS)?;
        let mut catalog: HashMap<u64, Option<IngredientRecord>> = HashMap::new();
        let mut lines = Vec::new();

        for recipe_id in &recipe_ids {
            for entry in recipe_ingredients.range(pair_prefix(*recipe_id))? {
                let (key, value) = entry?;
                let (_, ingredient_id) = key.value();
                let (_, amount) = value.value();

                if !catalog.contains_key(&ingredient_id) {
                    let record = read_record::<IngredientRecord>(&ingredients, ingredient_id)?;
                    catalog.insert(ingredient_id, record);
                }
                if let Some(Some(ingredient)) = catalog.get(&ingredient_id) {
                    lines.push((
                        ingredient.name.clone(),
                        ingredient.measurement_unit.clone(),
                        u64::from(amount),
                    ));
                }
            }
        }

        let items = consolidate(lines);
        tracing::debug!(
            "Shopping list for user {}: {} recipes, {} lines",
            actor,
            recipe_ids.len(),
            items.len()
        );
        Ok(items)
    }
}

/// Group `(name, unit, amount)` lines by exact name and unit, summing amounts
pub fn consolidate(lines: impl IntoIterator<Item = (String, String, u64)>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    for (name, unit, amount) in lines {
        *totals.entry((name, unit)).or_insert(0) += amount;
    }
    totals
        .into_iter()
        .map(|((name, unit), total)| ShoppingListItem::new(name, unit, total))
        .collect()
}

/// Turns a consolidated shopping list into a downloadable document
pub trait ShoppingListRenderer: Send + Sync {
    fn render(&self, items: &[ShoppingListItem]) -> RenderedDocument;
}

/// One `name (unit) - total` line per item
#[derive(Debug, Clone, Default)]
pub struct PlainTextRenderer;

impl ShoppingListRenderer for PlainTextRenderer {
    fn render(&self, items: &[ShoppingListItem]) -> RenderedDocument {
        let body: String = items
            .iter()
            .map(|item| {
                format!(
                    "{} ({}) - {}\n",
                    item.name, item.measurement_unit, item.total_amount
                )
            })
            .collect();

        RenderedDocument {
            filename: "shopping_list.txt".to_string(),
            content_type: "text/plain; charset=utf-8".to_string(),
            body: body.into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::test_support::TestEnv;

    fn line(name: &str, unit: &str, amount: u64) -> (String, String, u64) {
        (name.to_string(), unit.to_string(), amount)
    }

    #[test]
    fn test_consolidate_groups_by_name_and_unit() {
        let items = consolidate(vec![
            line("Salt", "g", 10),
            line("Pepper", "g", 2),
            line("Salt", "g", 5),
            line("Salt", "tsp", 1),
        ]);

        assert_eq!(
            items,
            vec![
                ShoppingListItem::new("Pepper", "g", 2),
                ShoppingListItem::new("Salt", "g", 15),
                ShoppingListItem::new("Salt", "tsp", 1),
            ]
        );
    }

    #[test]
    fn test_aggregate_across_cart_recipes() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let salt = env.ingredient("Salt", "g");
        let pepper = env.ingredient("Pepper", "g");
        let tag = env.tag("Dinner", "dinner");
        let first = env.recipe(ada, &[(salt, 10)], &[tag]);
        let second = env.recipe(ada, &[(salt, 5), (pepper, 2)], &[tag]);
        let not_in_cart = env.recipe(ada, &[(salt, 1000)], &[tag]);

        env.cart().add(ada, first).unwrap();
        env.cart().add(ada, second).unwrap();
        env.favorites().add(ada, not_in_cart).unwrap();

        let items = env.aggregator().aggregate(ada).unwrap();
        assert_eq!(
            items,
            vec![
                ShoppingListItem::new("Pepper", "g", 2),
                ShoppingListItem::new("Salt", "g", 15),
            ]
        );
    }

    #[test]
    fn test_same_name_different_unit_stays_separate() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        let grams = env.ingredient("Sugar", "g");
        let spoons = env.ingredient("Sugar", "tbsp");
        let tag = env.tag("Dessert", "dessert");
        let recipe = env.recipe(ada, &[(grams, 100), (spoons, 2)], &[tag]);
        env.cart().add(ada, recipe).unwrap();

        let items = env.aggregator().aggregate(ada).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], ShoppingListItem::new("Sugar", "g", 100));
        assert_eq!(items[1], ShoppingListItem::new("Sugar", "tbsp", 2));
    }

    #[test]
    fn test_empty_cart_is_empty_list() {
        let env = TestEnv::new();
        let ada = env.user("ada");
        assert!(env.aggregator().aggregate(ada).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_actor_is_unauthorized() {
        let env = TestEnv::new();
        assert!(matches!(
            env.aggregator().aggregate(7),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_plain_text_renderer() {
        let document = PlainTextRenderer.render(&[
            ShoppingListItem::new("Pepper", "g", 2),
            ShoppingListItem::new("Salt", "g", 15),
        ]);

        assert_eq!(document.filename, "shopping_list.txt");
        assert!(document.content_type.starts_with("text/plain"));
        assert_eq!(
            String::from_utf8(document.body).unwrap(),
            "Pepper (g) - 2\nSalt (g) - 15\n"
        );
    }
}
