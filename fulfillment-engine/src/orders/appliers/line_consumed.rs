use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Marks a line's ingredients as consumed.
///
/// The consumed list records what actually left stock, which the
/// refund path later scales for returns.
pub struct LineConsumedApplier;

impl EventApplier for LineConsumedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::LineConsumed {
            line_id, consumed, ..
        } = &event.payload
        {
            if let Some(line) = snapshot.find_line_mut(line_id) {
                line.inventory_consumed = true;
                line.consumed = consumed.clone();
            }
            super::touch(snapshot, event);
        }
    }
}
