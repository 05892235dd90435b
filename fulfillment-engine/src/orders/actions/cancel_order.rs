use async_trait::async_trait;

use super::{fold_and_save, load_existing, make_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// Cancels an order before completion.
///
/// Already-consumed ingredients are not returned to stock; prepared
/// food does not go back in the pantry. Adjustments for salvageable
/// stock go through receive_stock instead.
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
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
            | OrderStatus::Ready => {}
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(self.order_id.clone()));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            status => {
                return Err(OrderError::IllegalTransition {
                    from: status,
                    to: OrderStatus::Cancelled,
                });
            }
        }

        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::StatusChanged,
            EventPayload::StatusChanged {
                from: snapshot.status,
                to: OrderStatus::Cancelled,
                reason: self.reason.clone(),
            },
        )];

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}
