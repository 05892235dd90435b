use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// Initializes the snapshot from an OrderCreated event
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            order_number,
            branch_id,
            note,
        } = &event.payload
        {
            snapshot.order_id = event.order_id.clone();
            snapshot.order_number = order_number.clone();
            snapshot.branch_id = branch_id.clone();
            snapshot.note = note.clone();
            snapshot.status = OrderStatus::Draft;
            snapshot.created_by = event.operator_id.clone();
            snapshot.created_at = event.timestamp;
            super::touch(snapshot, event);
        }
    }
}
