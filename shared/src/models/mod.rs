//! Catalog, inventory and accounting entities

pub mod accounting;
pub mod catalog;
pub mod inventory;

pub use accounting::RevenueEntry;
pub use catalog::{Branch, MenuItem, Product, Recipe, RecipeRequirement};
pub use inventory::{
    ConsumedIngredient, IngredientRequirement, InventoryTransaction, StockRecord, StockShortfall,
    TransactionKind,
};
