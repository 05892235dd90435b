//! Inventory ledger types
//!
//! Stock is tracked per (product, location) as a running counter plus an
//! append-only transaction ledger. Every counter mutation writes exactly
//! one ledger row in the same storage transaction, so the counter is
//! always the running sum of its rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger row classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Purchase,
    Sale,
    Return,
    Adjustment,
    Transfer,
    Waste,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Purchase => write!(f, "PURCHASE"),
            TransactionKind::Sale => write!(f, "SALE"),
            TransactionKind::Return => write!(f, "RETURN"),
            TransactionKind::Adjustment => write!(f, "ADJUSTMENT"),
            TransactionKind::Transfer => write!(f, "TRANSFER"),
            TransactionKind::Waste => write!(f, "WASTE"),
        }
    }
}

/// Per-(product, location) stock counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub product_id: String,
    pub location_id: String,
    /// Never negative; decrements below zero are rejected, not clamped
    pub current_stock: Decimal,
    /// Threshold for restock alerts (informational)
    pub reorder_level: Decimal,
    pub updated_at: i64,
}

/// Append-only inventory ledger row
///
/// Quantity is signed: negative for consumption (sale, waste), positive
/// for intake (purchase, return). Rows are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryTransaction {
    pub id: String,
    pub product_id: String,
    pub location_id: String,
    pub quantity: Decimal,
    pub kind: TransactionKind,
    /// Order number or other document this row traces back to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub operator_id: String,
    pub timestamp: i64,
}

/// One resolved ingredient requirement for a line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngredientRequirement {
    pub product_id: String,
    pub quantity: Decimal,
    pub unit: String,
}

/// Audit record of an actually applied decrement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumedIngredient {
    pub product_id: String,
    pub quantity: Decimal,
    pub unit: String,
}

/// A requirement that could not be satisfied from stock
///
/// Shortfalls are warnings, not errors: the enclosing operation still
/// succeeds and the shortfall list rides on the command response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockShortfall {
    pub product_id: String,
    pub location_id: String,
    pub requested: Decimal,
    pub available: Decimal,
}
