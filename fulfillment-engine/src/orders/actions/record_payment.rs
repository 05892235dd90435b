use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{fold_and_save, load_existing, make_event};
use crate::catalog::CatalogService;
use crate::inventory::InventoryConsumptionService;
use crate::money::{is_payment_sufficient, round_money, validate_payment, MONEY_TOLERANCE};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, LineStatus, OrderEvent, OrderEventType, OrderStatus, PaymentInput, PaymentRecord,
    PaymentState,
};

/// Records a captured payment against an order.
///
/// Payments are captured synchronously; a record enters the snapshot
/// already in the Completed state. When cumulative captured payments
/// cover the total the order auto-completes in the same transaction,
/// consuming any lines that have not hit stock yet. An order that is
/// already completed still accepts payments until it is settled; only
/// its payment status changes, completion never runs twice.
pub struct RecordPaymentAction {
    pub order_id: String,
    pub payment: PaymentInput,
    pub catalog: Arc<CatalogService>,
}

#[async_trait]
impl CommandHandler for RecordPaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        match snapshot.status {
            OrderStatus::Draft
            | OrderStatus::Confirmed
            | OrderStatus::Processing
            | OrderStatus::Ready
            | OrderStatus::Completed => {}
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            status => {
                return Err(OrderError::InvalidOperation(format!(
                    "cannot record a payment on an order in status {status}"
                )));
            }
        }

        validate_payment(&self.payment)?;
        let amount = round_money(self.payment.amount);

        let remaining = snapshot.remaining_amount();
        if amount > remaining + MONEY_TOLERANCE {
            return Err(OrderError::PaymentOverflow {
                requested: amount,
                allowed: remaining,
            });
        }

        let record = PaymentRecord {
            payment_id: Uuid::new_v4().to_string(),
            method: self.payment.method,
            amount,
            state: PaymentState::Completed,
            reference: self.payment.reference.clone(),
            note: self.payment.note.clone(),
            operator_id: metadata.operator_id.clone(),
            timestamp: metadata.timestamp,
        };

        let mut events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::PaymentRecorded,
            EventPayload::PaymentRecorded { payment: record },
        )];

        // Reconciliation is re-entrant: a payment that lands on an
        // already-completed order only updates the payment status
        let paid_after = snapshot.paid_total + amount;
        if snapshot.status != OrderStatus::Completed
            && is_payment_sufficient(paid_after, snapshot.total)
            && snapshot.total > rust_decimal::Decimal::ZERO
        {
            let service = InventoryConsumptionService::new(ctx.storage(), &self.catalog);
            for line in &snapshot.lines {
                if line.status == LineStatus::Cancelled || line.inventory_consumed {
                    continue;
                }
                let result = service
                    .consume_line(
                        ctx.txn(),
                        line,
                        &snapshot.branch_id,
                        &snapshot.order_number,
                        &metadata.operator_id,
                    )
                    .map_err(|e| OrderError::Storage(e.to_string()))?;
                events.push(make_event(
                    ctx,
                    metadata,
                    &self.order_id,
                    OrderEventType::LineConsumed,
                    EventPayload::LineConsumed {
                        line_id: result.line_id,
                        consumed: result.consumed,
                        shortfalls: result.shortfalls,
                    },
                ));
            }

            events.push(make_event(
                ctx,
                metadata,
                &self.order_id,
                OrderEventType::StatusChanged,
                EventPayload::StatusChanged {
                    from: snapshot.status,
                    to: OrderStatus::Completed,
                    reason: Some("paid in full".to_string()),
                },
            ));
        }

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
