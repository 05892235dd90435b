//! Order events - immutable facts recorded after command processing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::snapshot::OrderStatus;
use super::types::{LineSnapshot, PaymentRecord, PaymentStatus};
use crate::models::{ConsumedIngredient, StockShortfall};
use crate::util::now_millis;

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - authoritative for state evolution
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit, may differ from
    /// server time due to clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

impl OrderEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp: now_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    StatusChanged,
    OrderDeleted,

    // Lines
    LineAdded,
    LineRemoved,
    LineConsumed,

    // Payments
    PaymentRecorded,
    RefundIssued,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            OrderEventType::StatusChanged => write!(f, "STATUS_CHANGED"),
            OrderEventType::OrderDeleted => write!(f, "ORDER_DELETED"),
            OrderEventType::LineAdded => write!(f, "LINE_ADDED"),
            OrderEventType::LineRemoved => write!(f, "LINE_REMOVED"),
            OrderEventType::LineConsumed => write!(f, "LINE_CONSUMED"),
            OrderEventType::PaymentRecorded => write!(f, "PAYMENT_RECORDED"),
            OrderEventType::RefundIssued => write!(f, "REFUND_ISSUED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    OrderCreated {
        /// Server-generated order number (always present)
        order_number: String,
        branch_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    OrderDeleted {},

    // ========== Lines ==========
    LineAdded {
        /// Complete snapshot of the added line
        line: LineSnapshot,
    },

    LineRemoved {
        line_id: String,
        name: String,
    },

    LineConsumed {
        line_id: String,
        /// Decrements actually applied to stock
        consumed: Vec<ConsumedIngredient>,
        /// Requirements that could not be satisfied (warnings)
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        shortfalls: Vec<StockShortfall>,
    },

    // ========== Payments ==========
    PaymentRecorded {
        payment: PaymentRecord,
    },

    RefundIssued {
        /// Compensating payment record (state = Refunded)
        payment: PaymentRecord,
        /// Refunded amount as a fraction of the order total
        ratio: Decimal,
        /// Ingredients returned to stock
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        returns: Vec<ConsumedIngredient>,
        new_status: OrderStatus,
        new_payment_status: PaymentStatus,
    },
}
