//! Startup loading of reference data from a JSON file.
//!
//! ```json
//! { "ingredients": [{"name": "Salt", "measurement_unit": "g"}],
//!   "tags": [{"name": "Lunch", "color": "#E26C2D", "slug": "lunch"}],
//!   "users": [{"email": "a@b.c", "username": "ada", "first_name": "Ada", "last_name": "L"}] }
//! ```
//!
//! Entries whose natural key already exists are skipped, so loading the same
//! file on every start is harmless.

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::models::{NewIngredient, NewTag, NewUser};
use crate::services::{Catalog, Users};

#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
    #[serde(default)]
    pub tags: Vec<NewTag>,
    #[serde(default)]
    pub users: Vec<NewUser>,
}

/// How many entries of each kind were created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixtureReport {
    pub ingredients: usize,
    pub tags: usize,
    pub users: usize,
    pub skipped: usize,
}

pub fn load_fixtures_file(
    path: impl AsRef<Path>,
    catalog: &Catalog,
    users: &Users,
) -> Result<FixtureReport> {
    tracing::info!("Loading fixtures from {:?}", path.as_ref());
    let bytes = std::fs::read(path.as_ref())?;
    let fixtures: Fixtures = serde_json::from_slice(&bytes)?;
    apply_fixtures(fixtures, catalog, users)
}

pub fn apply_fixtures(fixtures: Fixtures, catalog: &Catalog, users: &Users) -> Result<FixtureReport> {
    let mut report = FixtureReport::default();

    for ingredient in fixtures.ingredients {
        let name = ingredient.name.trim().to_string();
        if catalog
            .find_ingredient(&name, ingredient.measurement_unit.trim())?
            .is_some()
        {
            report.skipped += 1;
            continue;
        }
        catalog.create_ingredient(ingredient)?;
        report.ingredients += 1;
    }

    for tag in fixtures.tags {
        if catalog.find_tag_by_slug(&tag.slug)?.is_some() {
            report.skipped += 1;
            continue;
        }
        catalog.create_tag(tag)?;
        report.tags += 1;
    }

    for user in fixtures.users {
        if users.find_by_username(&user.username)?.is_some() {
            report.skipped += 1;
            continue;
        }
        users.create_user(user)?;
        report.users += 1;
    }

    tracing::info!(
        "Fixtures loaded: {} ingredients, {} tags, {} users ({} already present)",
        report.ingredients,
        report.tags,
        report.users,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestEnv;

    const FIXTURES: &str = r##"{
        "ingredients": [
            {"name": "Salt", "measurement_unit": "g"},
            {"name": "Salt", "measurement_unit": "tsp"},
            {"name": "Milk", "measurement_unit": "ml"}
        ],
        "tags": [{"name": "Breakfast", "color": "#e26c2d", "slug": "breakfast"}],
        "users": [{"email": "ada@example.com", "username": "ada", "first_name": "Ada", "last_name": "Lovelace"}]
    }"##;

    #[test]
    fn test_fixtures_are_loaded_once() {
        let env = TestEnv::new();
        let path = env.path("fixtures.json");
        std::fs::write(&path, FIXTURES).unwrap();

        let first = load_fixtures_file(&path, &env.catalog(), &env.users()).unwrap();
        assert_eq!(
            first,
            FixtureReport {
                ingredients: 3,
                tags: 1,
                users: 1,
                skipped: 0
            }
        );

        let second = load_fixtures_file(&path, &env.catalog(), &env.users()).unwrap();
        assert_eq!(second.skipped, 5);
        assert_eq!(second.ingredients + second.tags + second.users, 0);

        assert_eq!(env.catalog().list_ingredients(None).unwrap().len(), 3);
        assert_eq!(env.catalog().list_tags().unwrap()[0].color, "#E26C2D");
        assert!(env.users().find_by_username("ada").unwrap().is_some());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let env = TestEnv::new();
        let fixtures: Fixtures = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        let report = apply_fixtures(fixtures, &env.catalog(), &env.users()).unwrap();
        assert_eq!(report, FixtureReport::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let env = TestEnv::new();
        let path = env.path("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_fixtures_file(&path, &env.catalog(), &env.users()).is_err());
    }
}
