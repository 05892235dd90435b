use async_trait::async_trait;

use super::{fold_and_save, make_event};
use crate::orders::reducer::line_from_input;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, LineInput, OrderEvent, OrderEventType, OrderSnapshot};

/// Creates a draft order, optionally with initial lines.
///
/// The manager allocates the order number before the transaction
/// starts; counters are a separate self-committing write.
pub struct CreateOrderAction {
    pub order_id: String,
    pub order_number: String,
    pub branch_id: String,
    pub lines: Vec<LineInput>,
    pub note: Option<String>,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let mut events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                order_number: self.order_number.clone(),
                branch_id: self.branch_id.clone(),
                note: self.note.clone(),
            },
        )];

        for input in &self.lines {
            let line = line_from_input(input)?;
            events.push(make_event(
                ctx,
                metadata,
                &self.order_id,
                OrderEventType::LineAdded,
                EventPayload::LineAdded { line },
            ));
        }

        let snapshot = OrderSnapshot::new(self.order_id.clone());
        fold_and_save(ctx, snapshot, &events);

        tracing::info!(
            order_id = %self.order_id,
            order_number = %self.order_number,
            lines = self.lines.len(),
            "Order created"
        );
        Ok(events)
    }
}
