use async_trait::async_trait;

use super::{fold_and_save, load_existing, make_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// Soft-deletes a draft or cancelled order.
///
/// The event stream and snapshot survive for audit; the order just
/// stops showing up in active queries.
pub struct DeleteOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for DeleteOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        if !matches!(snapshot.status, OrderStatus::Draft | OrderStatus::Cancelled) {
            return Err(OrderError::InvalidOperation(format!(
                "only draft or cancelled orders can be deleted, order is {}",
                snapshot.status
            )));
        }

        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::OrderDeleted,
            EventPayload::OrderDeleted {},
        )];

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
