use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Appends a payment and refreshes paid total and payment status
pub struct PaymentRecordedApplier;

impl EventApplier for PaymentRecordedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::PaymentRecorded { payment } = &event.payload {
            snapshot.payments.push(payment.clone());
            super::recalculate_payment_status(snapshot);
            super::touch(snapshot, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::appliers::test_util::{event, snapshot};
    use rust_decimal::Decimal;
    use shared::order::{
        OrderEventType, PaymentMethod, PaymentRecord, PaymentState, PaymentStatus,
    };

    fn payment_event(amount_cents: i64) -> shared::order::OrderEvent {
        event(
            5,
            OrderEventType::PaymentRecorded,
            EventPayload::PaymentRecorded {
                payment: PaymentRecord {
                    payment_id: uuid::Uuid::new_v4().to_string(),
                    method: PaymentMethod::Cash,
                    amount: Decimal::new(amount_cents, 2),
                    state: PaymentState::Completed,
                    reference: None,
                    note: None,
                    operator_id: "op-1".to_string(),
                    timestamp: shared::util::now_millis(),
                },
            },
        )
    }

    #[test]
    fn test_partial_payment_keeps_partially_paid() {
        let mut snap = snapshot();
        snap.total = Decimal::new(100000, 2);

        PaymentRecordedApplier.apply(&mut snap, &payment_event(40000));

        assert_eq!(snap.paid_total, Decimal::new(40000, 2));
        assert_eq!(snap.payment_status, PaymentStatus::PartiallyPaid);
    }

    #[test]
    fn test_covering_payment_marks_paid() {
        let mut snap = snapshot();
        snap.total = Decimal::new(100000, 2);

        PaymentRecordedApplier.apply(&mut snap, &payment_event(40000));
        PaymentRecordedApplier.apply(&mut snap, &payment_event(60000));

        assert_eq!(snap.paid_total, Decimal::new(100000, 2));
        assert_eq!(snap.payment_status, PaymentStatus::Paid);
    }
}
