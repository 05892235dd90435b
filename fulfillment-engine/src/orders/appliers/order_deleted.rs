use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Soft delete: the snapshot stays queryable, the order leaves the
/// active set.
pub struct OrderDeletedApplier;

impl EventApplier for OrderDeletedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderDeleted {} = &event.payload {
            snapshot.deleted_at = Some(event.timestamp);
            super::touch(snapshot, event);
        }
    }
}
