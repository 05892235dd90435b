//! Core traits and context for the action/applier architecture.
//!
//! Actions validate a command against current state and produce events;
//! appliers fold events into snapshots. Both run inside the single write
//! transaction owned by the manager.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

use super::appliers::{
    EventAction, LineAddedApplier, LineConsumedApplier, LineRemovedApplier, OrderCreatedApplier,
    OrderDeletedApplier, PaymentRecordedApplier, RefundIssuedApplier, StatusChangedApplier,
};
use super::storage::OrderStorage;
use shared::order::{OrderEvent, OrderSnapshot, OrderStatus};

/// Domain errors raised while executing a command
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Line not found: {0}")]
    LineNotFound(String),

    #[error("Order already completed: {0}")]
    OrderAlreadyCompleted(String),

    #[error("Order already cancelled: {0}")]
    OrderAlreadyCancelled(String),

    #[error("Illegal transition: {from} -> {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Amount exceeds what the order allows: requested {requested}, allowed {allowed}")]
    PaymentOverflow { requested: Decimal, allowed: Decimal },

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Audit metadata carried from the command into every generated event
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Per-command execution context.
///
/// Wraps the write transaction, allocates event sequence numbers, and
/// buffers modified snapshots so later steps in the same command see
/// earlier changes before anything is persisted.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sequence: u64,
    snapshots: HashMap<String, OrderSnapshot>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            sequence: current_sequence,
            snapshots: HashMap::new(),
        }
    }

    /// Returned references carry the transaction lifetime, not the
    /// borrow of the context, so holding one does not freeze `self`
    pub fn txn(&self) -> &'a WriteTransaction {
        self.txn
    }

    pub fn storage(&self) -> &'a OrderStorage {
        self.storage
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Highest sequence allocated so far
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Load a snapshot, preferring uncommitted changes from this command
    pub fn load_snapshot(&mut self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.snapshots.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Buffer a modified snapshot for persistence at commit time
    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.snapshots.insert(snapshot.order_id.clone(), snapshot);
    }

    /// All snapshots modified by this command
    pub fn modified_snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.snapshots.values()
    }
}

/// Command handler - validates against current state and produces events
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier - pure fold of one event into a snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
