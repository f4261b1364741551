/// Smallest ingredient amount accepted in a recipe
pub const MIN_INGREDIENT_AMOUNT: i64 = 1;

/// Largest ingredient amount accepted in a recipe
pub const MAX_INGREDIENT_AMOUNT: i64 = 200_000;

/// Cooking time bounds in minutes
pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 32_767;

/// Maximum length of recipe, ingredient and tag names
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a username and of first/last names
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length of a tag slug
pub const MAX_SLUG_LENGTH: usize = 50;

/// Header set by the upstream authentication layer with the acting user's id
pub const ACTOR_HEADER: &str = "x-user-id";

/// Directory (under the media root) where recipe images are written
pub const RECIPE_IMAGE_DIR: &str = "recipes";

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_INGREDIENTS_REQUIRED: &str = "At least one ingredient is required";

pub const ERR_INGREDIENTS_DUPLICATED: &str = "Ingredients must not repeat";

pub const ERR_AMOUNT_OUT_OF_RANGE: &str = "Amount must be between 1 and 200000";

pub const ERR_TAGS_REQUIRED: &str = "At least one tag is required";

pub const ERR_COOKING_TIME_OUT_OF_RANGE: &str = "Cooking time must be between 1 and 32767 minutes";

pub const ERR_FIELD_REQUIRED: &str = "This field is required";

pub const ERR_FIELD_BLANK: &str = "This field may not be blank";

pub const ERR_NAME_TOO_LONG: &str = "Ensure this field has no more than 200 characters";

pub const ERR_SELF_SUBSCRIPTION: &str = "You cannot subscribe to yourself";
