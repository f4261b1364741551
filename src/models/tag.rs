use serde::{Deserialize, Serialize};

use crate::constants::{ERR_FIELD_BLANK, ERR_NAME_TOO_LONG, MAX_NAME_LENGTH, MAX_SLUG_LENGTH};
use crate::error::{Result, ValidationErrors};

/// Tag record stored in redb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl Tag {
    pub fn from_record(id: u64, record: TagRecord) -> Self {
        Self {
            id,
            name: record.name,
            color: record.color,
            slug: record.slug,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    /// Validate that a color is a `#RRGGBB` hex code
    pub fn validate_color(color: &str) -> bool {
        color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Validate that a slug only uses ASCII letters, digits, `-` and `_`
    pub fn validate_slug(slug: &str) -> bool {
        !slug.is_empty()
            && slug.len() <= MAX_SLUG_LENGTH
            && slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", ERR_FIELD_BLANK);
        } else if self.name.chars().count() > MAX_NAME_LENGTH {
            errors.add("name", ERR_NAME_TOO_LONG);
        }
        if !Self::validate_color(&self.color) {
            errors.add("color", "Enter a valid #RRGGBB color");
        }
        if !Self::validate_slug(&self.slug) {
            errors.add("slug", "Enter a valid slug of letters, numbers, underscores or hyphens");
        }

        errors.into_result()
    }

    pub fn into_record(self) -> TagRecord {
        TagRecord {
            name: self.name.trim().to_string(),
            color: self.color.to_ascii_uppercase(),
            slug: self.slug,
        }
    }
}
