//! Shared types for order event sourcing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ConsumedIngredient, StockShortfall};

// ============================================================================
// Line Types
// ============================================================================

/// Preparation status of a single order line
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

/// What a line sells: a direct product or a composed menu item.
///
/// Exactly one of the two; inputs carrying both or neither are rejected
/// during validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemRef {
    Product(String),
    MenuItem(String),
}

impl ItemRef {
    pub fn item_id(&self) -> &str {
        match self {
            ItemRef::Product(id) | ItemRef::MenuItem(id) => id,
        }
    }
}

/// Line input - for adding lines (without line_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    /// Direct product reference (mutually exclusive with menu_item_id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Menu item reference (mutually exclusive with product_id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_item_id: Option<String>,
    /// Name snapshot at order time
    pub name: String,
    /// Positive decimal quantity (3 dp)
    pub quantity: Decimal,
    /// Unit price snapshot at order time
    pub unit_price: Decimal,
    /// Tax amount for the whole line
    #[serde(default)]
    pub tax: Decimal,
    /// Discount amount for the whole line
    #[serde(default)]
    pub discount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Line snapshot - complete snapshot for event recording
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSnapshot {
    pub line_id: String,
    pub item: ItemRef,
    /// Name snapshot at order time
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// unit_price * quantity, rounded
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    /// subtotal + tax - discount
    pub total: Decimal,
    #[serde(default)]
    pub status: LineStatus,
    /// Idempotency guard: set once stock for this line has been consumed
    #[serde(default)]
    pub inventory_consumed: bool,
    /// Audit list of actually applied decrements
    #[serde(default)]
    pub consumed: Vec<ConsumedIngredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// Payment Types
// ============================================================================

/// Payment tender method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Cheque,
    BankTransfer,
    Mobile,
    Online,
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::Cheque => write!(f, "CHEQUE"),
            PaymentMethod::BankTransfer => write!(f, "BANK_TRANSFER"),
            PaymentMethod::Mobile => write!(f, "MOBILE"),
            PaymentMethod::Online => write!(f, "ONLINE"),
            PaymentMethod::Other => write!(f, "OTHER"),
        }
    }
}

/// State of an individual payment record
///
/// Only `Completed` payments count toward the reconciled balance.
/// `Pending`/`Failed` exist for external processors and replayed history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Pending,
    #[default]
    Completed,
    Failed,
    Refunded,
}

/// Order-level reconciliation status, derived from completed payments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
    Refunded,
    PartiallyRefunded,
}

/// Payment input for recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: Decimal,
    /// External transaction reference (processor ID, cheque number, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payment record in snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub method: PaymentMethod,
    pub amount: Decimal,
    #[serde(default)]
    pub state: PaymentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub operator_id: String,
    pub timestamp: i64,
}

// ============================================================================
// Command Response
// ============================================================================

/// Response to a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order ID the command acted on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Stock shortfalls recorded during best-effort consumption.
    /// Non-empty only on success; shortfalls never fail a command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<StockShortfall>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            shortfalls: Vec::new(),
            error: None,
        }
    }

    pub fn success_with_shortfalls(
        command_id: String,
        order_id: Option<String>,
        shortfalls: Vec<StockShortfall>,
    ) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            shortfalls,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            shortfalls: Vec::new(),
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            shortfalls: Vec::new(),
            error: None,
        }
    }
}

/// Command error details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes (stable identifiers for callers)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    LineNotFound,
    OrderAlreadyCompleted,
    OrderAlreadyCancelled,
    IllegalTransition,
    InsufficientStock,
    PaymentOverflow,
    InvalidAmount,
    InvalidOperation,
    ValidationFailed,
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
    InternalError,
}
