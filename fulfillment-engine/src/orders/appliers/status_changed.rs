use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, LineStatus, OrderEvent, OrderSnapshot, OrderStatus};

/// Moves the order to a new status.
///
/// Completion also marks every non-cancelled line as served; the
/// customer got everything still on the ticket.
pub struct StatusChangedApplier;

impl EventApplier for StatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::StatusChanged { to, .. } = &event.payload {
            snapshot.status = *to;

            if *to == OrderStatus::Completed {
                for line in &mut snapshot.lines {
                    if line.status != LineStatus::Cancelled {
                        line.status = LineStatus::Served;
                    }
                }
            }

            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_util::{event, line, snapshot};
    use shared::order::OrderEventType;

    fn status_event(from: OrderStatus, to: OrderStatus) -> shared::order::OrderEvent {
        event(
            2,
            OrderEventType::StatusChanged,
            EventPayload::StatusChanged {
                from,
                to,
                reason: None,
            },
        )
    }

    #[test]
    fn test_apply_moves_status() {
        let mut snap = snapshot();
        StatusChangedApplier.apply(
            &mut snap,
            &status_event(OrderStatus::Draft, OrderStatus::Confirmed),
        );
        assert_eq!(snap.status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_completion_marks_lines_served() {
        let mut snap = snapshot();
        let mut cancelled = line("line-2", 1, 500);
        cancelled.status = LineStatus::Cancelled;
        snap.lines = vec![line("line-1", 2, 1250), cancelled];

        StatusChangedApplier.apply(
            &mut snap,
            &status_event(OrderStatus::Ready, OrderStatus::Completed),
        );

        assert_eq!(snap.lines[0].status, LineStatus::Served);
        assert_eq!(snap.lines[1].status, LineStatus::Cancelled);
    }
}
