//! Order manager: the single entry point for commands, queries, and
//! stock movements.
//!
//! One command runs in one redb write transaction. Events, snapshots,
//! the active index, stock counters, ledger rows, and the idempotency
//! marker all commit together or not at all. Broadcasts (events,
//! revenue entries) happen only after commit.

pub mod error;
#[cfg(test)]
mod tests;

pub use error::ManagerError;

use chrono::Utc;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::catalog::CatalogService;
use crate::inventory::StockLedger;
use crate::orders::actions::{
    CommandAction, CompleteOrderAction, ConfirmOrderAction, CreateOrderAction, RecordPaymentAction,
};
use crate::orders::appliers::apply_event;
use crate::orders::storage::{OrderStorage, StorageStats};
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::{InventoryTransaction, RevenueEntry, StockRecord, TransactionKind};
use shared::order::{
    CommandResponse, EventPayload, OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot,
    PaymentState,
};
use shared::util::now_millis;

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const REVENUE_CHANNEL_CAPACITY: usize = 256;

pub struct OrdersManager {
    storage: OrderStorage,
    catalog: Arc<CatalogService>,
    event_tx: broadcast::Sender<OrderEvent>,
    revenue_tx: broadcast::Sender<RevenueEntry>,
    /// Millisecond timestamp of manager startup; consumers use it to
    /// scope event subscriptions to the current run
    epoch: i64,
}

impl OrdersManager {
    pub fn new(path: impl AsRef<Path>, catalog: Arc<CatalogService>) -> Result<Self, ManagerError> {
        let storage = OrderStorage::open(path)?;
        Ok(Self::with_storage_inner(storage, catalog))
    }

    #[cfg(test)]
    pub fn with_storage(storage: OrderStorage, catalog: Arc<CatalogService>) -> Self {
        Self::with_storage_inner(storage, catalog)
    }

    fn with_storage_inner(storage: OrderStorage, catalog: Arc<CatalogService>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (revenue_tx, _) = broadcast::channel(REVENUE_CHANNEL_CAPACITY);
        Self {
            storage,
            catalog,
            event_tx,
            revenue_tx,
            epoch: now_millis(),
        }
    }

    pub fn epoch(&self) -> i64 {
        self.epoch
    }

    /// Subscribe to committed order events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to revenue entries emitted for captured payments
    pub fn subscribe_revenue(&self) -> broadcast::Receiver<RevenueEntry> {
        self.revenue_tx.subscribe()
    }

    // ========== Command Processing ==========

    /// Execute a command and return the client-facing response.
    /// Errors are folded into the response; this never panics the
    /// caller's loop.
    pub fn execute_command(&self, command: OrderCommand) -> CommandResponse {
        let command_id = command.command_id.clone();
        match self.process_command(command) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(command_id = %command_id, error = %err, "Command failed");
                CommandResponse::error(command_id, err.into())
            }
        }
    }

    fn process_command(&self, command: OrderCommand) -> Result<CommandResponse, ManagerError> {
        // Fast path before taking the write lock
        if self.storage.is_command_processed(&command.command_id)? {
            tracing::debug!(command_id = %command.command_id, "Duplicate command acknowledged");
            return Ok(CommandResponse::duplicate(command.command_id));
        }

        let metadata = CommandMetadata {
            command_id: command.command_id.clone(),
            operator_id: command.operator_id.clone(),
            operator_name: command.operator_name.clone(),
            timestamp: command.timestamp,
        };

        // Order numbers come from a self-committing counter and must be
        // allocated before the command transaction opens
        let action = self.build_action(&command)?;

        let txn = self.storage.begin_write()?;

        // Re-check under the write lock
        if self.storage.is_command_processed_txn(&txn, &command.command_id)? {
            return Ok(CommandResponse::duplicate(command.command_id));
        }

        // Read the sequence only while holding the write lock; a read
        // before it could hand two commands the same starting point
        let current_sequence = self.storage.get_current_sequence()?;

        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::Order)?;

        for event in &events {
            self.storage.store_event(&txn, event)?;
        }

        let mut order_meta: Option<(String, String, String)> = None;
        for snapshot in ctx.modified_snapshots() {
            self.storage.store_snapshot(&txn, snapshot)?;
            if snapshot.is_active() {
                self.storage.mark_order_active(&txn, &snapshot.order_id)?;
            } else {
                self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
            }
            order_meta = Some((
                snapshot.order_id.clone(),
                snapshot.order_number.clone(),
                snapshot.branch_id.clone(),
            ));
        }

        self.storage.set_sequence(&txn, ctx.current_sequence())?;
        self.storage.mark_command_processed(&txn, &command.command_id)?;
        txn.commit().map_err(crate::orders::storage::StorageError::from)?;

        // Post-commit fan-out; a lagging or absent subscriber is not an error
        for event in &events {
            let _ = self.event_tx.send(event.clone());
        }
        if let Some((order_id, order_number, branch_id)) = &order_meta {
            self.emit_revenue_entries(&events, order_id, order_number, branch_id);
        }

        let order_id = order_meta.map(|(id, _, _)| id);
        let shortfalls: Vec<_> = events
            .iter()
            .filter_map(|e| match &e.payload {
                EventPayload::LineConsumed { shortfalls, .. } => Some(shortfalls.clone()),
                _ => None,
            })
            .flatten()
            .collect();

        Ok(if shortfalls.is_empty() {
            CommandResponse::success(command.command_id, order_id)
        } else {
            CommandResponse::success_with_shortfalls(command.command_id, order_id, shortfalls)
        })
    }

    /// Build the action for a command, injecting engine resources where
    /// a payload alone is not enough
    fn build_action(&self, command: &OrderCommand) -> Result<CommandAction, ManagerError> {
        Ok(match &command.payload {
            OrderCommandPayload::CreateOrder {
                branch_id,
                lines,
                note,
            } => {
                let branch_code = self.catalog.branch_code(branch_id).ok_or_else(|| {
                    ManagerError::InvalidCommand(format!("unknown branch: {branch_id}"))
                })?;
                CommandAction::CreateOrder(CreateOrderAction {
                    order_id: Uuid::new_v4().to_string(),
                    order_number: self.next_order_number(&branch_code)?,
                    branch_id: branch_id.clone(),
                    lines: lines.clone(),
                    note: note.clone(),
                })
            }
            OrderCommandPayload::ConfirmOrder { order_id } => {
                CommandAction::ConfirmOrder(ConfirmOrderAction {
                    order_id: order_id.clone(),
                    catalog: self.catalog.clone(),
                })
            }
            OrderCommandPayload::CompleteOrder { order_id } => {
                CommandAction::CompleteOrder(CompleteOrderAction {
                    order_id: order_id.clone(),
                    catalog: self.catalog.clone(),
                })
            }
            OrderCommandPayload::RecordPayment { order_id, payment } => {
                CommandAction::RecordPayment(RecordPaymentAction {
                    order_id: order_id.clone(),
                    payment: payment.clone(),
                    catalog: self.catalog.clone(),
                })
            }
            _ => CommandAction::from(command),
        })
    }

    /// Allocate the next order number: {branch_code}-{YYYYMMDD}-{seq:04}
    fn next_order_number(&self, branch_code: &str) -> Result<String, ManagerError> {
        let date = Utc::now().format("%Y%m%d").to_string();
        let count = self.storage.next_order_count(branch_code, &date)?;
        Ok(format!("{branch_code}-{date}-{count:04}"))
    }

    fn emit_revenue_entries(
        &self,
        events: &[OrderEvent],
        order_id: &str,
        order_number: &str,
        branch_id: &str,
    ) {
        for event in events {
            let EventPayload::PaymentRecorded { payment } = &event.payload else {
                continue;
            };
            if payment.state != PaymentState::Completed {
                continue;
            }
            let entry_number = match self.storage.next_revenue_count() {
                Ok(count) => format!("REV-{count:06}"),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to allocate revenue entry number");
                    continue;
                }
            };
            let entry = RevenueEntry {
                entry_number,
                order_id: order_id.to_string(),
                order_number: order_number.to_string(),
                payment_id: payment.payment_id.clone(),
                amount: payment.amount,
                method: payment.method,
                branch_id: branch_id.to_string(),
                operator_id: payment.operator_id.clone(),
                timestamp: payment.timestamp,
            };
            let _ = self.revenue_tx.send(entry);
        }
    }

    // ========== Stock Movements ==========

    /// Receive stock into a location (deliveries, positive adjustments)
    pub fn receive_stock(
        &self,
        product_id: &str,
        location_id: &str,
        quantity: Decimal,
        note: Option<&str>,
        operator_id: &str,
    ) -> Result<Decimal, ManagerError> {
        if quantity <= Decimal::ZERO {
            return Err(ManagerError::Order(OrderError::InvalidAmount));
        }
        let txn = self.storage.begin_write()?;
        let ledger = StockLedger::new(&self.storage);
        let balance = ledger.increment(
            &txn,
            product_id,
            location_id,
            quantity,
            TransactionKind::Purchase,
            None,
            note,
            operator_id,
        )?;
        txn.commit().map_err(crate::orders::storage::StorageError::from)?;
        tracing::info!(
            product_id = %product_id,
            location_id = %location_id,
            quantity = %quantity,
            balance = %balance,
            "Stock received"
        );
        Ok(balance)
    }

    /// Write off spoiled or lost stock
    pub fn record_waste(
        &self,
        product_id: &str,
        location_id: &str,
        quantity: Decimal,
        note: Option<&str>,
        operator_id: &str,
    ) -> Result<Decimal, ManagerError> {
        if quantity <= Decimal::ZERO {
            return Err(ManagerError::Order(OrderError::InvalidAmount));
        }
        let txn = self.storage.begin_write()?;
        let ledger = StockLedger::new(&self.storage);
        let outcome = ledger.try_decrement(
            &txn,
            product_id,
            location_id,
            quantity,
            TransactionKind::Waste,
            None,
            note,
            operator_id,
        )?;
        txn.commit().map_err(crate::orders::storage::StorageError::from)?;
        Ok(outcome.balance)
    }

    // ========== Queries ==========

    pub fn get_order(&self, order_id: &str) -> Result<Option<OrderSnapshot>, ManagerError> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    pub fn get_active_orders(&self) -> Result<Vec<OrderSnapshot>, ManagerError> {
        Ok(self.storage.get_active_orders()?)
    }

    pub fn get_events_for_order(&self, order_id: &str) -> Result<Vec<OrderEvent>, ManagerError> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    pub fn get_events_since(&self, sequence: u64) -> Result<Vec<OrderEvent>, ManagerError> {
        Ok(self.storage.get_events_since(sequence)?)
    }

    pub fn get_stock(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> Result<Option<StockRecord>, ManagerError> {
        Ok(self.storage.get_stock(product_id, location_id)?)
    }

    pub fn get_stock_for_location(
        &self,
        location_id: &str,
    ) -> Result<Vec<StockRecord>, ManagerError> {
        Ok(self.storage.get_stock_for_location(location_id)?)
    }

    /// Ledger rows written for an order, keyed by its order number
    pub fn get_transactions_for_order(
        &self,
        order_number: &str,
    ) -> Result<Vec<InventoryTransaction>, ManagerError> {
        Ok(self.storage.get_transactions_for_reference(order_number)?)
    }

    pub fn get_transactions_for_product(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> Result<Vec<InventoryTransaction>, ManagerError> {
        Ok(self.storage.get_transactions_for_product(product_id, location_id)?)
    }

    pub fn get_stats(&self) -> Result<StorageStats, ManagerError> {
        Ok(self.storage.get_stats()?)
    }

    /// Rebuild a snapshot by replaying the order's event stream.
    /// Recovery and audit tool; the stored snapshot stays untouched.
    pub fn rebuild_snapshot(&self, order_id: &str) -> Result<Option<OrderSnapshot>, ManagerError> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Ok(None);
        }
        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        for event in &events {
            apply_event(&mut snapshot, event);
        }
        Ok(Some(snapshot))
    }
}
