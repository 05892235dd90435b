use crate::orders::reducer::recalculate_totals;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Drops a line and refreshes order totals
pub struct LineRemovedApplier;

impl EventApplier for LineRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::LineRemoved { line_id, .. } = &event.payload {
            snapshot.lines.retain(|l| &l.line_id != line_id);
            recalculate_totals(snapshot);
            super::touch(snapshot, event);
        }
    }
}
