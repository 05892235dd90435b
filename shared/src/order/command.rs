//! Order commands - client requests to modify orders

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::snapshot::OrderStatus;
use super::types::{LineInput, PaymentInput};

/// Command envelope with idempotency key and audit metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Client-generated unique ID, used for idempotent retries
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Open a draft order at a branch, optionally with initial lines
    CreateOrder {
        branch_id: String,
        #[serde(default)]
        lines: Vec<LineInput>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// Add a line to a draft or confirmed order
    AddLine {
        order_id: String,
        line: LineInput,
    },

    /// Remove a not-yet-consumed line from a draft or confirmed order
    RemoveLine {
        order_id: String,
        line_id: String,
    },

    /// draft -> confirmed; pre-checks availability, then consumes stock
    ConfirmOrder {
        order_id: String,
    },

    /// Forward kitchen transition: confirmed -> processing -> ready
    AdvanceOrder {
        order_id: String,
        to: OrderStatus,
    },

    /// Terminal success: consumes any remaining lines, marks them served
    CompleteOrder {
        order_id: String,
    },

    /// Abort before completion; consumed stock is not reversed
    CancelOrder {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Soft-delete a draft or cancelled order
    SoftDeleteOrder {
        order_id: String,
    },

    /// Capture a payment and reconcile against the order total
    RecordPayment {
        order_id: String,
        payment: PaymentInput,
    },

    /// Refund a completed order, returning consumed stock proportionally
    RefundOrder {
        order_id: String,
        amount: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}
