use async_trait::async_trait;
use std::sync::Arc;

use super::{fold_and_save, load_existing, make_event};
use crate::catalog::CatalogService;
use crate::inventory::InventoryConsumptionService;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, ItemRef, LineStatus, OrderEvent, OrderEventType, OrderStatus};

/// Confirms a draft order and consumes its ingredients.
///
/// Confirmation is the one place stock is checked up front: a draft
/// whose menu-item lines cannot be covered stays a draft. Direct
/// product lines skip the check. Once past it, each line is consumed
/// and recorded; consumption after confirmation (lines added later,
/// completion) is best-effort instead.
pub struct ConfirmOrderAction {
    pub order_id: String,
    pub catalog: Arc<CatalogService>,
}

#[async_trait]
impl CommandHandler for ConfirmOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        match snapshot.status {
            OrderStatus::Draft => {}
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(self.order_id.clone()));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            status => {
                return Err(OrderError::IllegalTransition {
                    from: status,
                    to: OrderStatus::Confirmed,
                });
            }
        }

        let active_lines: Vec<_> = snapshot
            .lines
            .iter()
            .filter(|l| l.status != LineStatus::Cancelled)
            .collect();
        if active_lines.is_empty() {
            return Err(OrderError::Validation(
                "order has no lines to confirm".to_string(),
            ));
        }

        let service = InventoryConsumptionService::new(ctx.storage(), &self.catalog);

        // Pre-check menu-item lines before touching stock; direct
        // product lines are consumed best-effort like any other stock
        // movement after confirmation
        let mut all_shortfalls = Vec::new();
        for line in &active_lines {
            if matches!(line.item, ItemRef::Product(_)) {
                continue;
            }
            let shortfalls = service
                .check_line_availability(ctx.txn(), line, &snapshot.branch_id)
                .map_err(|e| OrderError::Storage(e.to_string()))?;
            all_shortfalls.extend(shortfalls);
        }
        if !all_shortfalls.is_empty() {
            let detail = all_shortfalls
                .iter()
                .map(|s| format!("{} (need {}, have {})", s.product_id, s.requested, s.available))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(OrderError::InsufficientStock(detail));
        }

        let mut events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::StatusChanged,
            EventPayload::StatusChanged {
                from: OrderStatus::Draft,
                to: OrderStatus::Confirmed,
                reason: None,
            },
        )];

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

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
