//! Shared reference data: ingredients and tags.

use redb::ReadableDatabase;

use crate::db::{next_id, read_all, read_record, tables, write_record, Db};
use crate::error::{AppError, Result};
use crate::models::{Ingredient, IngredientRecord, NewIngredient, NewTag, Tag, TagRecord};

#[derive(Clone)]
pub struct Catalog {
    db: Db,
}

impl Catalog {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient> {
        ingredient.validate()?;
        let record = ingredient.into_record();

        let write_txn = self.db.begin_write()?;
        let id = next_id(&write_txn, "ingredients")?;
        {
            let mut ingredients = write_txn.open_table(tables::INGREDIENTS)?;
            write_record(&mut ingredients, id, &record)?;
        }
        write_txn.commit()?;

        tracing::info!("Ingredient {} created: {}", id, record.name);
        Ok(Ingredient::from_record(id, record))
    }

    pub fn get_ingredient(&self, id: u64) -> Result<Ingredient> {
        let read_txn = self.db.begin_read()?;
        let ingredients = read_txn.open_table(tables::INGREDIENTS)?;
        read_record::<IngredientRecord>(&ingredients, id)?
            .map(|record| Ingredient::from_record(id, record))
            .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))
    }

    /// Ingredients ordered by name, optionally restricted to a case-insensitive name prefix
    pub fn list_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let prefix = name_prefix
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());

        let read_txn = self.db.begin_read()?;
        let ingredients = read_txn.open_table(tables::INGREDIENTS)?;
        let mut found: Vec<Ingredient> = read_all::<IngredientRecord>(&ingredients)?
            .into_iter()
            .filter(|(_, record)| match &prefix {
                Some(prefix) => record.name.to_lowercase().starts_with(prefix.as_str()),
                None => true,
            })
            .map(|(id, record)| Ingredient::from_record(id, record))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        tracing::debug!("Listed {} ingredients", found.len());
        Ok(found)
    }

    /// Exact lookup by the (name, unit) pair
    pub fn find_ingredient(&self, name: &str, measurement_unit: &str) -> Result<Option<Ingredient>> {
        let read_txn = self.db.begin_read()?;
        let ingredients = read_txn.open_table(tables::INGREDIENTS)?;
        let found = read_all::<IngredientRecord>(&ingredients)?
            .into_iter()
            .find(|(_, record)| record.name == name && record.measurement_unit == measurement_unit)
            .map(|(id, record)| Ingredient::from_record(id, record));
        Ok(found)
    }

    pub fn create_tag(&self, tag: NewTag) -> Result<Tag> {
        tag.validate()?;
        let record = tag.into_record();

        let write_txn = self.db.begin_write()?;
        let id = next_id(&write_txn, "tags")?;
        {
            let mut tags = write_txn.open_table(tables::TAGS)?;
            write_record(&mut tags, id, &record)?;
        }
        write_txn.commit()?;

        tracing::info!("Tag {} created: {}", id, record.slug);
        Ok(Tag::from_record(id, record))
    }

    pub fn get_tag(&self, id: u64) -> Result<Tag> {
        let read_txn = self.db.begin_read()?;
        let tags = read_txn.open_table(tables::TAGS)?;
        read_record::<TagRecord>(&tags, id)?
            .map(|record| Tag::from_record(id, record))
            .ok_or_else(|| AppError::NotFound("Tag".to_string()))
    }

    /// All tags ordered by name
    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        let read_txn = self.db.begin_read()?;
        let tags = read_txn.open_table(tables::TAGS)?;
        let mut found: Vec<Tag> = read_all::<TagRecord>(&tags)?
            .into_iter()
            .map(|(id, record)| Tag::from_record(id, record))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    pub fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        Ok(self.list_tags()?.into_iter().find(|tag| tag.slug == slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestEnv;

    #[test]
    fn test_ingredients_are_listed_by_name_and_filtered_by_prefix() {
        let env = TestEnv::new();
        let catalog = env.catalog();
        env.ingredient("Sugar", "g");
        env.ingredient("salt", "g");
        env.ingredient("Butter", "g");

        let names: Vec<String> = catalog
            .list_ingredients(None)
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Butter", "Sugar", "salt"]);

        let names: Vec<String> = catalog
            .list_ingredients(Some("S"))
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Sugar", "salt"]);
    }

    #[test]
    fn test_blank_ingredient_name_is_rejected() {
        let env = TestEnv::new();
        let err = env
            .catalog()
            .create_ingredient(NewIngredient {
                name: "".to_string(),
                measurement_unit: "g".to_string(),
            })
            .unwrap_err();
        assert!(err.validation_errors().unwrap().contains("name"));
        assert!(env.catalog().list_ingredients(None).unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let env = TestEnv::new();
        assert!(env.catalog().get_ingredient(42).unwrap_err().is_not_found());
        assert!(env.catalog().get_tag(42).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tags_lookup() {
        let env = TestEnv::new();
        let lunch = env.tag("Lunch", "lunch");
        env.tag("Breakfast", "breakfast");

        assert_eq!(env.catalog().get_tag(lunch).unwrap().slug, "lunch");
        assert_eq!(
            env.catalog()
                .find_tag_by_slug("lunch")
                .unwrap()
                .map(|t| t.id),
            Some(lunch)
        );

        let slugs: Vec<String> = env
            .catalog()
            .list_tags()
            .unwrap()
            .into_iter()
            .map(|t| t.slug)
            .collect();
        assert_eq!(slugs, vec!["breakfast", "lunch"]);
    }
}
