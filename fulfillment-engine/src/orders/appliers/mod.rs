//! Event appliers: pure folds of one event into an order snapshot.
//!
//! Dispatch is static via enum_dispatch. `From<&OrderEvent>` is the
//! single place that maps payloads to appliers; replay and live
//! processing both go through it, so they can never disagree.

mod line_added;
mod line_consumed;
mod line_removed;
mod order_created;
mod order_deleted;
mod payment_recorded;
mod refund_issued;
mod status_changed;

pub use line_added::LineAddedApplier;
pub use line_consumed::LineConsumedApplier;
pub use line_removed::LineRemovedApplier;
pub use order_created::OrderCreatedApplier;
pub use order_deleted::OrderDeletedApplier;
pub use payment_recorded::PaymentRecordedApplier;
pub use refund_issued::RefundIssuedApplier;
pub use status_changed::StatusChangedApplier;

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, PaymentState};

#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    StatusChanged(StatusChangedApplier),
    OrderDeleted(OrderDeletedApplier),
    LineAdded(LineAddedApplier),
    LineRemoved(LineRemovedApplier),
    LineConsumed(LineConsumedApplier),
    PaymentRecorded(PaymentRecordedApplier),
    RefundIssued(RefundIssuedApplier),
}

impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::StatusChanged { .. } => EventAction::StatusChanged(StatusChangedApplier),
            EventPayload::OrderDeleted {} => EventAction::OrderDeleted(OrderDeletedApplier),
            EventPayload::LineAdded { .. } => EventAction::LineAdded(LineAddedApplier),
            EventPayload::LineRemoved { .. } => EventAction::LineRemoved(LineRemovedApplier),
            EventPayload::LineConsumed { .. } => EventAction::LineConsumed(LineConsumedApplier),
            EventPayload::PaymentRecorded { .. } => {
                EventAction::PaymentRecorded(PaymentRecordedApplier)
            }
            EventPayload::RefundIssued { .. } => EventAction::RefundIssued(RefundIssuedApplier),
        }
    }
}

/// Apply an event to a snapshot through the dispatch table
pub fn apply_event(snapshot: &mut OrderSnapshot, event: &OrderEvent) {
    let action = EventAction::from(event);
    action.apply(snapshot, event);
}

/// Audit fields every applier maintains
pub(crate) fn touch(snapshot: &mut OrderSnapshot, event: &OrderEvent) {
    snapshot.last_sequence = event.sequence;
    snapshot.updated_at = event.timestamp;
    snapshot.last_modified_by = event.operator_id.clone();
}

/// Recompute paid total and payment status from the payment list
pub(crate) fn recalculate_payment_status(snapshot: &mut OrderSnapshot) {
    use rust_decimal::Decimal;
    use shared::order::PaymentStatus;

    let paid: Decimal = snapshot
        .payments
        .iter()
        .filter(|p| p.state == PaymentState::Completed)
        .map(|p| p.amount)
        .sum();
    snapshot.paid_total = paid;

    snapshot.payment_status = if paid <= Decimal::ZERO {
        PaymentStatus::Unpaid
    } else if crate::money::is_payment_sufficient(paid, snapshot.total)
        && snapshot.total > Decimal::ZERO
    {
        PaymentStatus::Paid
    } else {
        PaymentStatus::PartiallyPaid
    };
}

#[cfg(test)]
pub(crate) mod test_util {
    use rust_decimal::Decimal;
    use shared::order::{
        EventPayload, ItemRef, LineSnapshot, LineStatus, OrderEvent, OrderEventType, OrderSnapshot,
    };

    pub fn event(
        sequence: u64,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> OrderEvent {
        OrderEvent::new(
            sequence,
            "order-1".to_string(),
            "op-1".to_string(),
            "Operator One".to_string(),
            uuid::Uuid::new_v4().to_string(),
            None,
            event_type,
            payload,
        )
    }

    pub fn snapshot() -> OrderSnapshot {
        OrderSnapshot::new("order-1".to_string())
    }

    pub fn line(line_id: &str, quantity: i64, unit_price_cents: i64) -> LineSnapshot {
        let quantity = Decimal::new(quantity, 0);
        let unit_price = Decimal::new(unit_price_cents, 2);
        let subtotal = unit_price * quantity;
        LineSnapshot {
            line_id: line_id.to_string(),
            item: ItemRef::MenuItem("pizza".to_string()),
            name: "Margherita".to_string(),
            quantity,
            unit_price,
            subtotal,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: subtotal,
            status: LineStatus::Pending,
            inventory_consumed: false,
            consumed: Vec::new(),
            note: None,
        }
    }
}
