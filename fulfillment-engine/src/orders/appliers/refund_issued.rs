use crate::money::round_money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// Applies a refund: compensating payment record, refunded total, and
/// the order and payment statuses the action decided on.
pub struct RefundIssuedApplier;

impl EventApplier for RefundIssuedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::RefundIssued {
            payment,
            new_status,
            new_payment_status,
            ..
        } = &event.payload
        {
            snapshot.payments.push(payment.clone());
            snapshot.refunded_total = round_money(snapshot.refunded_total + payment.amount);
            snapshot.status = *new_status;
            snapshot.payment_status = *new_payment_status;
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
        OrderEventType, OrderStatus, PaymentMethod, PaymentRecord, PaymentState, PaymentStatus,
    };

    #[test]
    fn test_apply_accumulates_refunded_total() {
        let mut snap = snapshot();
        snap.status = OrderStatus::Completed;
        snap.total = Decimal::new(10000, 2);

        let ev = event(
            6,
            OrderEventType::RefundIssued,
            EventPayload::RefundIssued {
                payment: PaymentRecord {
                    payment_id: uuid::Uuid::new_v4().to_string(),
                    method: PaymentMethod::Cash,
                    amount: Decimal::new(4000, 2),
                    state: PaymentState::Refunded,
                    reference: None,
                    note: None,
                    operator_id: "op-1".to_string(),
                    timestamp: shared::util::now_millis(),
                },
                ratio: Decimal::new(4, 1),
                returns: Vec::new(),
                new_status: OrderStatus::PartialRefund,
                new_payment_status: PaymentStatus::PartiallyRefunded,
            },
        );
        RefundIssuedApplier.apply(&mut snap, &ev);

        assert_eq!(snap.refunded_total, Decimal::new(4000, 2));
        assert_eq!(snap.status, OrderStatus::PartialRefund);
        assert_eq!(snap.payment_status, PaymentStatus::PartiallyRefunded);
        assert_eq!(snap.payments.len(), 1);
        assert_eq!(snap.payments[0].state, PaymentState::Refunded);
    }
}
