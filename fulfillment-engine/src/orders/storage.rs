//! redb-based storage layer for the fulfillment engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `events` | `(order_id, sequence)` | `OrderEvent` | Event stream (append-only) |
//! | `snapshots` | `order_id` | `OrderSnapshot` | Snapshot cache |
//! | `active_orders` | `order_id` | `()` | Active order index |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `counters` | counter key | `u64` | Sequence, order numbers, ledger seq |
//! | `stock` | `(product_id, location_id)` | `StockRecord` | Stock counters |
//! | `inventory_log` | ledger sequence | `InventoryTransaction` | Inventory ledger (append-only) |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: copy-on-write with an
//! atomic pointer swap, so the file stays consistent across power loss.
//! Stock counters and their ledger rows are written in the same
//! transaction as events and snapshots, so a logical operation commits
//! or rolls back as a unit.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use shared::models::{InventoryTransaction, StockRecord};
use shared::order::{OrderEvent, OrderSnapshot};

/// Table for storing events: key = (order_id, sequence), value = JSON-serialized OrderEvent
const EVENTS_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("events");

/// Table for storing snapshots: key = order_id, value = JSON-serialized OrderSnapshot
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshots");

/// Table for tracking active orders: key = order_id, value = empty (existence check)
const ACTIVE_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("active_orders");

/// Table for tracking processed commands: key = command_id, value = empty (idempotency)
const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

/// Table for counters: event sequence, per-branch-day order numbers,
/// revenue entry numbers, ledger sequence
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Table for stock counters: key = (product_id, location_id), value = JSON StockRecord
const STOCK_TABLE: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("stock");

/// Table for the inventory ledger: key = ledger sequence, value = JSON InventoryTransaction
const INVENTORY_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("inventory_log");

const SEQUENCE_KEY: &str = "seq";
const LEDGER_SEQUENCE_KEY: &str = "ledger_seq";
const REVENUE_COUNT_KEY: &str = "revenue_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order and inventory storage backed by redb
#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl OrderStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(EVENTS_TABLE)?;
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(STOCK_TABLE)?;
            let _ = write_txn.open_table(INVENTORY_LOG_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(SEQUENCE_KEY)?.is_none() {
                counters.insert(SEQUENCE_KEY, 0u64)?;
            }
            if counters.get(LEDGER_SEQUENCE_KEY)?.is_none() {
                counters.insert(LEDGER_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence Operations ==========

    /// Get current event sequence (read-only)
    pub fn get_current_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table
            .get(SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    /// Set the event sequence (within transaction)
    ///
    /// Called after actions have allocated sequence numbers for their events.
    pub fn set_sequence(&self, txn: &WriteTransaction, sequence: u64) -> StorageResult<()> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        table.insert(SEQUENCE_KEY, sequence)?;
        Ok(())
    }

    /// Increment and return the ledger sequence (within transaction)
    pub fn next_ledger_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let next = table
            .get(LEDGER_SEQUENCE_KEY)?
            .map(|g| g.value())
            .unwrap_or(0)
            + 1;
        table.insert(LEDGER_SEQUENCE_KEY, next)?;
        Ok(next)
    }

    // ========== Order / Revenue Number Counters ==========

    /// Get and increment the per-branch per-day order counter atomically.
    /// Returns the NEW count. Crash-safe: the counter commits before the
    /// order transaction begins, so numbers are unique even if the order
    /// itself fails (gaps are acceptable, duplicates are not).
    pub fn next_order_count(&self, branch_code: &str, date: &str) -> StorageResult<u64> {
        let key = format!("order_count:{branch_code}:{date}");
        self.bump_counter(&key)
    }

    /// Get and increment the revenue entry counter atomically
    pub fn next_revenue_count(&self) -> StorageResult<u64> {
        self.bump_counter(REVENUE_COUNT_KEY)
    }

    fn bump_counter(&self, key: &str) -> StorageResult<u64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut table = txn.open_table(COUNTERS_TABLE)?;
            let next = table.get(key)?.map(|g| g.value()).unwrap_or(0) + 1;
            table.insert(key, next)?;
            next
        };
        txn.commit()?;
        Ok(next)
    }

    // ========== Command Idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Mark a command as processed
    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Event Operations ==========

    /// Store an event
    pub fn store_event(&self, txn: &WriteTransaction, event: &OrderEvent) -> StorageResult<()> {
        let mut table = txn.open_table(EVENTS_TABLE)?;
        let key = (event.order_id.as_str(), event.sequence);
        let value = serde_json::to_vec(event)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all events for an order
    pub fn get_events_for_order(&self, order_id: &str) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        let range_start = (order_id, 0u64);
        let range_end = (order_id, u64::MAX);

        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            events.push(event);
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    /// Get events since a given sequence (across all orders)
    pub fn get_events_since(&self, since_sequence: u64) -> StorageResult<Vec<OrderEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EVENTS_TABLE)?;

        let mut events = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let event: OrderEvent = serde_json::from_slice(value.value())?;
            if event.sequence > since_sequence {
                events.push(event);
            }
        }

        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    // ========== Snapshot Operations ==========

    /// Store a snapshot
    pub fn store_snapshot(
        &self,
        txn: &WriteTransaction,
        snapshot: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SNAPSHOTS_TABLE)?;
        let value = serde_json::to_vec(snapshot)?;
        table.insert(snapshot.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Get a snapshot by order ID (within transaction)
    pub fn get_snapshot_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let table = txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => {
                let snapshot: OrderSnapshot = serde_json::from_slice(value.value())?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    // ========== Active Orders ==========

    /// Mark an order as active
    pub fn mark_order_active(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Mark an order as inactive
    pub fn mark_order_inactive(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Check if an order is active
    pub fn is_order_active(&self, order_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        Ok(table.get(order_id)?.is_some())
    }

    /// Get all active order IDs
    pub fn get_active_order_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;

        let mut order_ids: Vec<String> = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            order_ids.push(key.value().to_string());
        }

        Ok(order_ids)
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> StorageResult<Vec<OrderSnapshot>> {
        let active_ids = self.get_active_order_ids()?;
        let mut snapshots = Vec::new();

        for order_id in active_ids {
            if let Some(snapshot) = self.get_snapshot(&order_id)? {
                snapshots.push(snapshot);
            }
        }

        Ok(snapshots)
    }

    // ========== Stock Operations ==========

    /// Get a stock record (read-only)
    pub fn get_stock(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> StorageResult<Option<StockRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STOCK_TABLE)?;

        match table.get((product_id, location_id))? {
            Some(value) => {
                let record: StockRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Get a stock record (within transaction)
    pub fn get_stock_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        location_id: &str,
    ) -> StorageResult<Option<StockRecord>> {
        let table = txn.open_table(STOCK_TABLE)?;

        match table.get((product_id, location_id))? {
            Some(value) => {
                let record: StockRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Store a stock record (within transaction)
    pub fn put_stock_txn(&self, txn: &WriteTransaction, record: &StockRecord) -> StorageResult<()> {
        let mut table = txn.open_table(STOCK_TABLE)?;
        let value = serde_json::to_vec(record)?;
        table.insert(
            (record.product_id.as_str(), record.location_id.as_str()),
            value.as_slice(),
        )?;
        Ok(())
    }

    /// Get all stock records for a location
    pub fn get_stock_for_location(&self, location_id: &str) -> StorageResult<Vec<StockRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STOCK_TABLE)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let record: StockRecord = serde_json::from_slice(value.value())?;
            if record.location_id == location_id {
                records.push(record);
            }
        }
        Ok(records)
    }

    // ========== Inventory Ledger ==========

    /// Append a ledger row (within transaction)
    pub fn append_inventory_transaction(
        &self,
        txn: &WriteTransaction,
        row: &InventoryTransaction,
    ) -> StorageResult<u64> {
        let seq = self.next_ledger_sequence(txn)?;
        let mut table = txn.open_table(INVENTORY_LOG_TABLE)?;
        let value = serde_json::to_vec(row)?;
        table.insert(seq, value.as_slice())?;
        Ok(seq)
    }

    /// Get ledger rows referencing an order number
    pub fn get_transactions_for_reference(
        &self,
        reference: &str,
    ) -> StorageResult<Vec<InventoryTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_LOG_TABLE)?;

        let mut rows = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let row: InventoryTransaction = serde_json::from_slice(value.value())?;
            if row.reference.as_deref() == Some(reference) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Get ledger rows for a product at a location
    pub fn get_transactions_for_product(
        &self,
        product_id: &str,
        location_id: &str,
    ) -> StorageResult<Vec<InventoryTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(INVENTORY_LOG_TABLE)?;

        let mut rows = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let row: InventoryTransaction = serde_json::from_slice(value.value())?;
            if row.product_id == product_id && row.location_id == location_id {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    // ========== Statistics ==========

    /// Get storage statistics
    pub fn get_stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let events_table = read_txn.open_table(EVENTS_TABLE)?;
        let snapshots_table = read_txn.open_table(SNAPSHOTS_TABLE)?;
        let active_table = read_txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let commands_table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        let ledger_table = read_txn.open_table(INVENTORY_LOG_TABLE)?;
        let counters_table = read_txn.open_table(COUNTERS_TABLE)?;

        Ok(StorageStats {
            event_count: events_table.len()?,
            snapshot_count: snapshots_table.len()?,
            active_order_count: active_table.len()?,
            processed_command_count: commands_table.len()?,
            ledger_row_count: ledger_table.len()?,
            current_sequence: counters_table
                .get(SEQUENCE_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub event_count: u64,
    pub snapshot_count: u64,
    pub active_order_count: u64,
    pub processed_command_count: u64,
    pub ledger_row_count: u64,
    pub current_sequence: u64,
}
