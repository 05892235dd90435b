use crate::orders::reducer::recalculate_totals;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Appends a line and refreshes order totals
pub struct LineAddedApplier;

impl EventApplier for LineAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::LineAdded { line } = &event.payload {
            snapshot.lines.push(line.clone());
            recalculate_totals(snapshot);
            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_util::{event, line, snapshot};
    use rust_decimal::Decimal;
    use shared::order::OrderEventType;

    #[test]
    fn test_apply_appends_and_totals() {
        let mut snap = snapshot();
        let ev = event(
            2,
            OrderEventType::LineAdded,
            EventPayload::LineAdded {
                line: line("line-1", 2, 1250),
            },
        );

        LineAddedApplier.apply(&mut snap, &ev);

        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.subtotal, Decimal::new(2500, 2));
        assert_eq!(snap.total, Decimal::new(2500, 2));
    }
}
