//! User accounts as far as this core needs them: profiles, uniqueness and
//! the cascade that runs when an account is removed.
//!
//! Registration and authentication happen elsewhere; the registration
//! collaborator provisions accounts through [`Users::create_user`].

use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};

use crate::db::{
    next_id, read_all, read_record, remove_pairs_with_first, remove_pairs_with_second, tables,
    write_record, Db,
};
use crate::error::{AppError, Result};
use crate::models::{NewUser, Profile, RecipeRecord, UserRecord};
use crate::services::projections;

#[derive(Clone)]
pub struct Users {
    db: Db,
}

impl Users {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn create_user(&self, user: NewUser) -> Result<Profile> {
        user.validate()?;
        let email_key = user.email.trim().to_lowercase();

        let write_txn = self.db.begin_write()?;
        let id = next_id(&write_txn, "users")?;
        let record = UserRecord {
            email: user.email.trim().to_string(),
            username: user.username,
            first_name: user.first_name.trim().to_string(),
            last_name: user.last_name.trim().to_string(),
            created_at: Utc::now().timestamp(),
        };
        {
            let mut usernames = write_txn.open_table(tables::USERNAMES)?;
            if usernames.get(record.username.as_str())?.is_some() {
                tracing::info!("Username already taken: {}", record.username);
                return Err(AppError::Conflict(
                    "A user with that username already exists".to_string(),
                ));
            }
            usernames.insert(record.username.as_str(), id)?;

            let mut emails = write_txn.open_table(tables::EMAILS)?;
            if emails.get(email_key.as_str())?.is_some() {
                tracing::info!("Email already registered");
                return Err(AppError::Conflict(
                    "A user with that email already exists".to_string(),
                ));
            }
            emails.insert(email_key.as_str(), id)?;

            let mut users = write_txn.open_table(tables::USERS)?;
            write_record(&mut users, id, &record)?;
        }
        write_txn.commit()?;

        tracing::info!("User {} created: {}", id, record.username);
        Ok(Profile::from_record(id, record, false))
    }

    /// Public profile of `id` as seen by `viewer`
    pub fn get_profile(&self, viewer: Option<u64>, id: u64) -> Result<Profile> {
        let read_txn = self.db.begin_read()?;
        projections::profile(&read_txn, viewer, id)?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let usernames = read_txn.open_table(tables::USERNAMES)?;
        let id = usernames.get(username)?.map(|v| v.value());
        Ok(id)
    }

    /// Remove an account
    ///
    /// The user's favorites, cart entries and subscriptions (in both directions)
    /// are deleted. Their recipes persist with no author.
    pub fn remove_user(&self, id: u64) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(tables::USERS)?;
            let record: UserRecord = match read_record(&users, id)? {
                Some(record) => record,
                None => return Err(AppError::NotFound("User".to_string())),
            };
            users.remove(id)?;

            let mut usernames = write_txn.open_table(tables::USERNAMES)?;
            usernames.remove(record.username.as_str())?;
            let mut emails = write_txn.open_table(tables::EMAILS)?;
            emails.remove(record.email.to_lowercase().as_str())?;

            let mut favorites = write_txn.open_table(tables::FAVORITES)?;
            remove_pairs_with_first(&mut favorites, id)?;
            let mut cart = write_txn.open_table(tables::SHOPPING_CART)?;
            remove_pairs_with_first(&mut cart, id)?;

            let mut subscriptions = write_txn.open_table(tables::SUBSCRIPTIONS)?;
            remove_pairs_with_first(&mut subscriptions, id)?;
            remove_pairs_with_second(&mut subscriptions, id)?;

            let mut recipes = write_txn.open_table(tables::RECIPES)?;
            let orphaned: Vec<(u64, RecipeRecord)> = read_all::<RecipeRecord>(&recipes)?
                .into_iter()
                .filter(|(_, recipe)| recipe.author == Some(id))
                .collect();
            for (recipe_id, mut recipe) in orphaned {
                recipe.author = None;
                write_record(&mut recipes, recipe_id, &recipe)?;
            }
        }
        write_txn.commit()?;

        tracing::info!("User {} removed", id);
        Ok(())
    }
}
