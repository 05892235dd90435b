//! Catalog entities: branches, sellable products and composed menu items.
//!
//! These are read-only reference data from the engine's point of view.
//! Administration of the catalog happens elsewhere; the engine only
//! resolves lines against it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A physical location holding stock and issuing orders
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Branch {
    pub id: String,
    /// Short code used as the order number prefix (e.g. "MAD01")
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

/// A directly sellable (and stockable) product
///
/// Products double as ingredients: a menu item's recipe references
/// products, and stock records are kept per product per branch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Stock-keeping unit, e.g. "kg", "l", "unit"
    pub unit: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_active: bool,
}

/// A composed menu item sold through a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Recipe expanding one serving into ingredient quantities.
    /// A menu item without a recipe consumes nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
    #[serde(default)]
    pub is_active: bool,
}

/// Ingredient expansion for one serving of a menu item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub requirements: Vec<RecipeRequirement>,
    /// Free-form preparation metadata, passed through unparsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One ingredient requirement of a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeRequirement {
    /// Ingredient product ID
    pub product_id: String,
    /// Quantity consumed per serving, in the product's unit
    pub quantity: Decimal,
    pub unit: String,
}
