//! Command actions: validate a command against current state, produce
//! events, and fold them into the context's snapshot buffer.
//!
//! Most actions are built straight from the command payload. The
//! variants that need engine resources (a pre-allocated order number,
//! the catalog for recipe resolution) are constructed by the manager,
//! so `From<&OrderCommand>` treats them as unreachable.

mod add_line;
mod advance_order;
mod cancel_order;
mod complete_order;
mod confirm_order;
mod create_order;
mod delete_order;
mod record_payment;
mod refund_order;
mod remove_line;

pub use add_line::AddLineAction;
pub use advance_order::AdvanceOrderAction;
pub use cancel_order::CancelOrderAction;
pub use complete_order::CompleteOrderAction;
pub use confirm_order::ConfirmOrderAction;
pub use create_order::CreateOrderAction;
pub use delete_order::DeleteOrderAction;
pub use record_payment::RecordPaymentAction;
pub use refund_order::RefundOrderAction;
pub use remove_line::RemoveLineAction;

use async_trait::async_trait;

use crate::orders::appliers::apply_event;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, OrderCommand, OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot,
};

pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    AddLine(AddLineAction),
    RemoveLine(RemoveLineAction),
    ConfirmOrder(ConfirmOrderAction),
    AdvanceOrder(AdvanceOrderAction),
    CompleteOrder(CompleteOrderAction),
    CancelOrder(CancelOrderAction),
    DeleteOrder(DeleteOrderAction),
    RecordPayment(RecordPaymentAction),
    RefundOrder(RefundOrderAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AddLine(action) => action.execute(ctx, metadata).await,
            CommandAction::RemoveLine(action) => action.execute(ctx, metadata).await,
            CommandAction::ConfirmOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AdvanceOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CompleteOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::DeleteOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::RecordPayment(action) => action.execute(ctx, metadata).await,
            CommandAction::RefundOrder(action) => action.execute(ctx, metadata).await,
        }
    }
}

impl From<&OrderCommand> for CommandAction {
    fn from(command: &OrderCommand) -> Self {
        match &command.payload {
            OrderCommandPayload::AddLine { order_id, line } => {
                CommandAction::AddLine(AddLineAction {
                    order_id: order_id.clone(),
                    line: line.clone(),
                })
            }
            OrderCommandPayload::RemoveLine { order_id, line_id } => {
                CommandAction::RemoveLine(RemoveLineAction {
                    order_id: order_id.clone(),
                    line_id: line_id.clone(),
                })
            }
            OrderCommandPayload::AdvanceOrder { order_id, to } => {
                CommandAction::AdvanceOrder(AdvanceOrderAction {
                    order_id: order_id.clone(),
                    to: *to,
                })
            }
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::SoftDeleteOrder { order_id } => {
                CommandAction::DeleteOrder(DeleteOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::RefundOrder {
                order_id,
                amount,
                note,
            } => CommandAction::RefundOrder(RefundOrderAction {
                order_id: order_id.clone(),
                amount: *amount,
                note: note.clone(),
            }),
            // These carry engine resources and are built by the manager
            OrderCommandPayload::CreateOrder { .. }
            | OrderCommandPayload::ConfirmOrder { .. }
            | OrderCommandPayload::CompleteOrder { .. }
            | OrderCommandPayload::RecordPayment { .. } => {
                unreachable!("constructed directly by the manager")
            }
        }
    }
}

/// Build an event from command metadata, allocating the next sequence
pub(crate) fn make_event(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    order_id: &str,
    event_type: OrderEventType,
    payload: EventPayload,
) -> OrderEvent {
    OrderEvent::new(
        ctx.next_sequence(),
        order_id.to_string(),
        metadata.operator_id.clone(),
        metadata.operator_name.clone(),
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        event_type,
        payload,
    )
}

/// Load a snapshot, treating soft-deleted orders as missing
pub(crate) fn load_existing(
    ctx: &mut CommandContext<'_>,
    order_id: &str,
) -> Result<OrderSnapshot, OrderError> {
    let snapshot = ctx.load_snapshot(order_id)?;
    if snapshot.deleted_at.is_some() {
        return Err(OrderError::OrderNotFound(order_id.to_string()));
    }
    Ok(snapshot)
}

/// Fold events into the snapshot and buffer it on the context
pub(crate) fn fold_and_save(
    ctx: &mut CommandContext<'_>,
    mut snapshot: OrderSnapshot,
    events: &[OrderEvent],
) {
    for event in events {
        apply_event(&mut snapshot, event);
    }
    ctx.save_snapshot(snapshot);
}
