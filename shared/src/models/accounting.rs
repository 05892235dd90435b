//! Accounting hand-off types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::PaymentMethod;

/// Revenue recognition request emitted for every completed payment.
///
/// The engine does not own the books; it broadcasts one entry per
/// completed payment and the accounting subscriber persists it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueEntry {
    /// Server-assigned entry number, e.g. "RE-20260825-0042"
    pub entry_number: String,
    pub order_id: String,
    pub order_number: String,
    pub payment_id: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub branch_id: String,
    pub operator_id: String,
    pub timestamp: i64,
}
