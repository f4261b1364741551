use serde::Serialize;

/// One consolidated line of a shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: u64,
}

impl ShoppingListItem {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, total_amount: u64) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            total_amount,
        }
    }
}

/// A shopping list rendered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    pub body: Vec<u8>,
}
