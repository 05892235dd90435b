use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{fold_and_save, load_existing, make_event};
use crate::inventory::StockLedger;
use crate::money::{round_money, round_quantity, MONEY_TOLERANCE};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::{ConsumedIngredient, TransactionKind};
use shared::order::{
    EventPayload, LineStatus, OrderEvent, OrderEventType, OrderStatus, PaymentMethod,
    PaymentRecord, PaymentState, PaymentStatus,
};

/// Refunds part or all of a completed order.
///
/// The refunded share of each line's recorded consumption goes back to
/// stock as Return rows, scaled by amount / total. Only what actually
/// left stock comes back; shortfall quantities were never decremented
/// and are never returned.
pub struct RefundOrderAction {
    pub order_id: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[async_trait]
impl CommandHandler for RefundOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        match snapshot.status {
            OrderStatus::Completed | OrderStatus::PartialRefund => {}
            OrderStatus::Refunded => {
                return Err(OrderError::InvalidOperation(format!(
                    "order {} is already fully refunded",
                    self.order_id
                )));
            }
            status => {
                return Err(OrderError::InvalidOperation(format!(
                    "only completed orders can be refunded, order is {status}"
                )));
            }
        }

        if self.amount <= Decimal::ZERO {
            return Err(OrderError::InvalidAmount);
        }
        let amount = round_money(self.amount);

        let refundable = snapshot.refundable_total();
        if amount > refundable + MONEY_TOLERANCE {
            return Err(OrderError::PaymentOverflow {
                requested: amount,
                allowed: refundable,
            });
        }
        if snapshot.total <= Decimal::ZERO {
            return Err(OrderError::InvalidOperation(
                "order has no refundable total".to_string(),
            ));
        }

        let ratio = amount / snapshot.total;
        let ledger = StockLedger::new(ctx.storage());
        let mut returns: Vec<ConsumedIngredient> = Vec::new();

        for line in &snapshot.lines {
            if line.status == LineStatus::Cancelled || !line.inventory_consumed {
                continue;
            }
            for consumed in &line.consumed {
                let quantity = round_quantity(consumed.quantity * ratio);
                if quantity <= Decimal::ZERO {
                    continue;
                }
                ledger
                    .increment(
                        ctx.txn(),
                        &consumed.product_id,
                        &snapshot.branch_id,
                        quantity,
                        TransactionKind::Return,
                        Some(&snapshot.order_number),
                        self.note.as_deref(),
                        &metadata.operator_id,
                    )
                    .map_err(|e| OrderError::Storage(e.to_string()))?;
                returns.push(ConsumedIngredient {
                    product_id: consumed.product_id.clone(),
                    quantity,
                    unit: consumed.unit.clone(),
                });
            }
        }

        // Full refund when nothing refundable remains afterwards
        let fully_refunded = amount >= refundable - MONEY_TOLERANCE;
        let (new_status, new_payment_status) = if fully_refunded {
            (OrderStatus::Refunded, PaymentStatus::Refunded)
        } else {
            (OrderStatus::PartialRefund, PaymentStatus::PartiallyRefunded)
        };

        // Refund with the method the customer originally paid with
        let method = snapshot
            .payments
            .iter()
            .find(|p| p.state == PaymentState::Completed)
            .map(|p| p.method)
            .unwrap_or(PaymentMethod::Other);

        let record = PaymentRecord {
            payment_id: Uuid::new_v4().to_string(),
            method,
            amount,
            state: PaymentState::Refunded,
            reference: None,
            note: self.note.clone(),
            operator_id: metadata.operator_id.clone(),
            timestamp: metadata.timestamp,
        };

        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::RefundIssued,
            EventPayload::RefundIssued {
                payment: record,
                ratio,
                returns,
                new_status,
                new_payment_status,
            },
        )];

        tracing::info!(
            order_id = %self.order_id,
            amount = %amount,
            ratio = %ratio,
            full = fully_refunded,
            "Refund issued"
        );

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
