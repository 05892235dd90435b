use async_trait::async_trait;

use super::{fold_and_save, load_existing, make_event};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// Moves an order one step along the kitchen flow:
/// confirmed -> processing -> ready.
pub struct AdvanceOrderAction {
    pub order_id: String,
    pub to: OrderStatus,
}

#[async_trait]
impl CommandHandler for AdvanceOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = load_existing(ctx, &self.order_id)?;

        let allowed = matches!(
            (snapshot.status, self.to),
            (OrderStatus::Confirmed, OrderStatus::Processing)
                | (OrderStatus::Processing, OrderStatus::Ready)
        );
        if !allowed {
            return Err(OrderError::IllegalTransition {
                from: snapshot.status,
                to: self.to,
            });
        }

        let events = vec![make_event(
            ctx,
            metadata,
            &self.order_id,
            OrderEventType::StatusChanged,
            EventPayload::StatusChanged {
                from: snapshot.status,
                to: self.to,
                reason: None,
            },
        )];

        fold_and_save(ctx, snapshot, &events);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_util::{
        create_draft, pizza_line, run_action, seed_stock, test_catalog,
    };
    use crate::orders::actions::{CommandAction, ConfirmOrderAction};
    use crate::orders::storage::OrderStorage;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn advance(order_id: &str, to: OrderStatus) -> CommandAction {
        CommandAction::AdvanceOrder(AdvanceOrderAction {
            order_id: order_id.to_string(),
            to,
        })
    }

    async fn confirmed_order(storage: &OrderStorage) -> String {
        let catalog = Arc::new(test_catalog());
        seed_stock(storage, "flour", Decimal::new(5000, 3));
        let order_id = create_draft(storage, vec![pizza_line(1)]).await;
        run_action(
            storage,
            &CommandAction::ConfirmOrder(ConfirmOrderAction {
                order_id: order_id.clone(),
                catalog,
            }),
        )
        .await
        .unwrap();
        order_id
    }

    #[tokio::test]
    async fn test_advance_through_kitchen_flow() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = confirmed_order(&storage).await;

        run_action(&storage, &advance(&order_id, OrderStatus::Processing))
            .await
            .unwrap();
        run_action(&storage, &advance(&order_id, OrderStatus::Ready))
            .await
            .unwrap();

        let snapshot = storage.get_snapshot(&order_id).unwrap().unwrap();
        assert_eq!(snapshot.status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn test_advance_rejects_skipping_steps() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = confirmed_order(&storage).await;

        let err = run_action(&storage, &advance(&order_id, OrderStatus::Ready))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_advance_rejects_draft() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let order_id = create_draft(&storage, vec![pizza_line(1)]).await;

        let err = run_action(&storage, &advance(&order_id, OrderStatus::Processing))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IllegalTransition { .. }));
    }
}
