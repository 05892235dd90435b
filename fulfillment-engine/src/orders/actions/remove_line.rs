use async_trait::async_trait;

use super::{fold_and_save, load_existing, make_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// Removes a line from a draft or confirmed order.
///
/// A line whose ingredients already left stock cannot be removed; the
/// ledger would no longer reconcile against the order.
pub struct RemoveLineAction {
    pub order_id: String,
    pub line_id: String,
}

#[async_trait]
impl CommandHandler for RemoveLineAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        match snapshot.status {
            OrderStatus::Draft | OrderStatus::Confirmed => {}
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(self.order_id.clone()));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            status => {
                return Err(OrderError::InvalidOperation(format!(
                    "cannot remove a line from an order in status {status}"
                )));
            }
        }

        let line = snapshot
            .find_line(&self.line_id)
            .ok_or_else(|| OrderError::LineNotFound(self.line_id.clone()))?;
        if line.inventory_consumed {
            return Err(OrderError::InvalidOperation(format!(
                "line {} has consumed inventory and cannot be removed",
                self.line_id
            )));
        }

        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::LineRemoved,
            EventPayload::LineRemoved {
                line_id: self.line_id.clone(),
                name: line.name.clone(),
            },
        )];

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
