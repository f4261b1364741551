use redb::TableDefinition;

/// Id sequences: entity name -> last issued id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Users table: user_id -> UserRecord (serialized)
pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique username index: username -> user_id
pub const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Unique email index: lowercased email -> user_id
pub const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");

/// Ingredients table: ingredient_id -> IngredientRecord (serialized)
pub const INGREDIENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("ingredients");

/// Tags table: tag_id -> TagRecord (serialized)
pub const TAGS: TableDefinition<u64, &[u8]> = TableDefinition::new("tags");

/// Recipes table: recipe_id -> RecipeRecord (serialized)
pub const RECIPES: TableDefinition<u64, &[u8]> = TableDefinition::new("recipes");

/// Recipe ingredients: (recipe_id, ingredient_id) -> (position, amount)
/// The composite key is the uniqueness constraint on the pair
pub const RECIPE_INGREDIENTS: TableDefinition<(u64, u64), (u32, u32)> =
    TableDefinition::new("recipe_ingredients");

/// Recipe tags: (recipe_id, tag_id) -> ()
pub const RECIPE_TAGS: TableDefinition<(u64, u64), ()> = TableDefinition::new("recipe_tags");

/// Favorites: (user_id, recipe_id) -> created_at (Unix timestamp)
pub const FAVORITES: TableDefinition<(u64, u64), i64> = TableDefinition::new("favorites");

/// Shopping cart: (user_id, recipe_id) -> created_at (Unix timestamp)
pub const SHOPPING_CART: TableDefinition<(u64, u64), i64> = TableDefinition::new("shopping_cart");

/// Subscriptions: (subscriber_id, target_id) -> created_at (Unix timestamp)
pub const SUBSCRIPTIONS: TableDefinition<(u64, u64), i64> = TableDefinition::new("subscriptions");
