use serde::{Deserialize, Serialize};

use crate::constants::{ERR_FIELD_BLANK, MAX_USERNAME_LENGTH};
use crate::error::{Result, ValidationErrors};
use crate::models::ShortRecipe;

/// User record stored in redb
/// Uses Unix timestamp for compact storage with bincode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// When the user was created (Unix timestamp)
    pub created_at: i64,
}

/// Account data handed over by the registration collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Validate that a username only uses letters, digits and `.@+-_`
    pub fn validate_username(username: &str) -> bool {
        !username.is_empty()
            && username.chars().count() <= MAX_USERNAME_LENGTH
            && username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
    }

    /// Loose email shape check: one `@` with text on both sides
    pub fn validate_email(email: &str) -> bool {
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if !Self::validate_username(&self.username) {
            errors.add(
                "username",
                "Enter a valid username of letters, digits and ./@/+/-/_ characters",
            );
        }
        if !Self::validate_email(&self.email) {
            errors.add("email", "Enter a valid email address");
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() {
                errors.add(field, ERR_FIELD_BLANK);
            } else if value.chars().count() > MAX_USERNAME_LENGTH {
                errors.add(field, "Ensure this field has no more than 150 characters");
            }
        }

        errors.into_result()
    }
}

/// Public profile as seen by a particular viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: u64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl Profile {
    pub fn from_record(id: u64, record: UserRecord, is_subscribed: bool) -> Self {
        Self {
            id,
            email: record.email,
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            is_subscribed,
        }
    }
}

/// Profile of a followed author together with a preview of their recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub profile: Profile,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_validate_username() {
        assert!(NewUser::validate_username("chef.ada+1@home_x-y"));
        assert!(!NewUser::validate_username(""));
        assert!(!NewUser::validate_username("with space"));
        assert!(!NewUser::validate_username(&"a".repeat(151)));
        assert!(NewUser::validate_username(&"a".repeat(150)));
    }

    #[test]
    fn test_validate_email() {
        assert!(NewUser::validate_email("ada@example.com"));
        assert!(!NewUser::validate_email("ada.example.com"));
        assert!(!NewUser::validate_email("@example.com"));
        assert!(!NewUser::validate_email("ada@"));
    }

    #[test]
    fn test_validate_reports_fields() {
        assert!(new_user("ada", "ada@example.com").validate().is_ok());

        let mut user = new_user("bad name", "nope");
        user.last_name = "  ".to_string();
        let err = user.validate().unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
        assert!(errors.contains("last_name"));
        assert!(!errors.contains("first_name"));
    }

    #[test]
    fn test_user_record_serialization() {
        let record = UserRecord {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            created_at: 1733788800,
        };

        let bytes = crate::db::encode(&record).unwrap();
        let deserialized: UserRecord = crate::db::decode(&bytes).unwrap();

        assert_eq!(record.username, deserialized.username);
        assert_eq!(record.created_at, deserialized.created_at);
    }
}
