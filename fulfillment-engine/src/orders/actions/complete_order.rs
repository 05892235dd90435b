use async_trait::async_trait;
use std::sync::Arc;

use super::{fold_and_save, load_existing, make_event};
use crate::catalog::CatalogService;
use crate::inventory::InventoryConsumptionService;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, LineStatus, OrderEvent, OrderEventType, OrderStatus};

/// Completes an order from any pre-terminal status.
///
/// Completion is best-effort on inventory: lines not yet consumed are
/// consumed now, shortfalls are recorded on the event rather than
/// failing the handover. Payment is not required to complete.
pub struct CompleteOrderAction {
    pub order_id: String,
    pub catalog: Arc<CatalogService>,
}

#[async_trait]
impl CommandHandler for CompleteOrderAction {
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
                    to: OrderStatus::Completed,
                });
            }
        }

        let mut events = Vec::new();
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
                reason: None,
            },
        ));

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
    use crate::orders::actions::CommandAction;
    use crate::orders::storage::OrderStorage;
    use rust_decimal::Decimal;

    fn complete(order_id: &str, catalog: &Arc<CatalogService>) -> CommandAction {
        CommandAction::CompleteOrder(CompleteOrderAction {
            order_id: order_id.to_string(),
            catalog: catalog.clone(),
        })
    }

    #[tokio::test]
    async fn test_complete_consumes_and_serves() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let catalog = Arc::new(test_catalog());
        seed_stock(&storage, "flour", Decimal::new(1200, 3));
        let order_id = create_draft(&storage, vec![pizza_line(2)]).await;

        let events = run_action(&storage, &complete(&order_id, &catalog))
            .await
            .unwrap();
        assert_eq!(events.len(), 2);

        let snapshot = storage.get_snapshot(&order_id).unwrap().unwrap();
        assert_eq!(snapshot.status, OrderStatus::Completed);
        assert_eq!(snapshot.lines[0].status, LineStatus::Served);
        assert!(snapshot.lines[0].inventory_consumed);

        let stock = storage.get_stock("flour", "b-1").unwrap().unwrap();
        assert_eq!(stock.current_stock, Decimal::new(200, 3));
    }

    #[tokio::test]
    async fn test_complete_with_shortfall_still_completes() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let catalog = Arc::new(test_catalog());
        seed_stock(&storage, "flour", Decimal::new(300, 3));
        let order_id = create_draft(&storage, vec![pizza_line(2)]).await;

        let events = run_action(&storage, &complete(&order_id, &catalog))
            .await
            .unwrap();
        let shortfalls: Vec<_> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::LineConsumed { shortfalls, .. } => Some(shortfalls.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].requested, Decimal::new(1000, 3));
        assert_eq!(shortfalls[0].available, Decimal::new(300, 3));

        let snapshot = storage.get_snapshot(&order_id).unwrap().unwrap();
        assert_eq!(snapshot.status, OrderStatus::Completed);
        // Guard still set so the line is never consumed twice
        assert!(snapshot.lines[0].inventory_consumed);
        assert!(snapshot.lines[0].consumed.is_empty());

        // Shortfall leaves stock untouched
        let stock = storage.get_stock("flour", "b-1").unwrap().unwrap();
        assert_eq!(stock.current_stock, Decimal::new(300, 3));
    }

    #[tokio::test]
    async fn test_complete_twice_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let catalog = Arc::new(test_catalog());
        seed_stock(&storage, "flour", Decimal::new(5000, 3));
        let order_id = create_draft(&storage, vec![pizza_line(1)]).await;

        run_action(&storage, &complete(&order_id, &catalog))
            .await
            .unwrap();
        let err = run_action(&storage, &complete(&order_id, &catalog))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderAlreadyCompleted(_)));

        // No double consumption
        let stock = storage.get_stock("flour", "b-1").unwrap().unwrap();
        assert_eq!(stock.current_stock, Decimal::new(4500, 3));
    }
}
