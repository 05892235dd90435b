use async_trait::async_trait;

use super::{fold_and_save, load_existing, make_event};
use crate::orders::reducer::line_from_input;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, LineInput, OrderEvent, OrderEventType, OrderStatus};

/// Adds a line to a draft or confirmed order.
///
/// Lines added after confirmation consume their ingredients at
/// completion like any other unconsumed line.
pub struct AddLineAction {
    pub order_id: String,
    pub line: LineInput,
}

#[async_trait]
impl CommandHandler for AddLineAction {
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
                    "cannot add a line to an order in status {status}"
                )));
            }
        }

        let line = line_from_input(&self.line)?;
        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::LineAdded,
            EventPayload::LineAdded { line },
        )];

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
