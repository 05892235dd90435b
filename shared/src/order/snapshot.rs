//! Order snapshot - computed state from event stream

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{LineSnapshot, PaymentRecord, PaymentState, PaymentStatus};
use crate::util::now_millis;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    Processing,
    Ready,
    Completed,
    Cancelled,
    Refunded,
    PartialRefund,
}

impl OrderStatus {
    /// Whether the order still belongs in the active index.
    /// Completed and cancelled/refunded orders are settled history.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Draft
                | OrderStatus::Confirmed
                | OrderStatus::Processing
                | OrderStatus::Ready
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Draft => write!(f, "DRAFT"),
            OrderStatus::Confirmed => write!(f, "CONFIRMED"),
            OrderStatus::Processing => write!(f, "PROCESSING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
            OrderStatus::Refunded => write!(f, "REFUNDED"),
            OrderStatus::PartialRefund => write!(f, "PARTIAL_REFUND"),
        }
    }
}

/// Order snapshot - current state computed from the event stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: String,
    /// Branch-prefixed, date-sequenced number, e.g. "MAD01-20260825-0007"
    pub order_number: String,
    pub branch_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub lines: Vec<LineSnapshot>,
    pub payments: Vec<PaymentRecord>,
    /// Sum of line subtotals (cancelled lines excluded)
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    /// subtotal + tax - discount
    pub total: Decimal,
    /// Sum of completed payments
    pub paid_total: Decimal,
    /// Sum of issued refunds
    pub refunded_total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_by: String,
    pub last_modified_by: String,
    /// Soft-delete marker; deleted orders leave the active index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Sequence of the last applied event
    pub last_sequence: u64,
}

impl OrderSnapshot {
    pub fn new(order_id: String) -> Self {
        let now = now_millis();
        Self {
            order_id,
            order_number: String::new(),
            branch_id: String::new(),
            status: OrderStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
            lines: Vec::new(),
            payments: Vec::new(),
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
            paid_total: Decimal::ZERO,
            refunded_total: Decimal::ZERO,
            note: None,
            created_by: String::new(),
            last_modified_by: String::new(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
            last_sequence: 0,
        }
    }

    /// Whether the order should appear in the active index
    pub fn is_active(&self) -> bool {
        self.status.is_active() && self.deleted_at.is_none()
    }

    /// Sum of completed payments (the reconciled balance)
    pub fn completed_paid_total(&self) -> Decimal {
        self.payments
            .iter()
            .filter(|p| p.state == PaymentState::Completed)
            .map(|p| p.amount)
            .sum()
    }

    /// Amount still refundable: completed payments minus prior refunds
    pub fn refundable_total(&self) -> Decimal {
        self.completed_paid_total() - self.refunded_total
    }

    pub fn remaining_amount(&self) -> Decimal {
        (self.total - self.paid_total).max(Decimal::ZERO)
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_total >= self.total
    }

    pub fn find_line(&self, line_id: &str) -> Option<&LineSnapshot> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    pub fn find_line_mut(&mut self, line_id: &str) -> Option<&mut LineSnapshot> {
        self.lines.iter_mut().find(|l| l.line_id == line_id)
    }
}
