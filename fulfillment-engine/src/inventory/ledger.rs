//! Stock ledger: per-location counters plus an append-only transaction
//! log. Every counter change writes exactly one ledger row in the same
//! write transaction, so counters and history cannot diverge.

use redb::WriteTransaction;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::money::round_quantity;
use crate::orders::storage::{OrderStorage, StorageResult};
use shared::models::{InventoryTransaction, StockRecord, TransactionKind};
use shared::util::now_millis;

/// Result of a decrement attempt. Shortfalls are data, not errors.
#[derive(Debug, Clone)]
pub struct DecrementOutcome {
    /// Quantity removed from stock: the full request, or zero on
    /// shortfall
    pub applied: Decimal,
    /// Stock balance after the operation
    pub balance: Decimal,
}

impl DecrementOutcome {
    pub fn succeeded(&self) -> bool {
        self.applied > Decimal::ZERO
    }
}

/// Ledger operations over the storage layer.
///
/// All methods take the caller's write transaction; the ledger never
/// commits on its own.
pub struct StockLedger<'a> {
    storage: &'a OrderStorage,
}

impl<'a> StockLedger<'a> {
    pub fn new(storage: &'a OrderStorage) -> Self {
        Self { storage }
    }

    /// Decrement stock, rejecting the whole request on shortfall.
    ///
    /// All or nothing: if less than `quantity` is on hand, stock and
    /// ledger stay untouched and the outcome reports zero applied.
    /// Missing stock records count as zero on hand. The conditional
    /// check and the write share the caller's transaction, so
    /// concurrent decrements on the same key serialize through it.
    #[allow(clippy::too_many_arguments)]
    pub fn try_decrement(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        location_id: &str,
        quantity: Decimal,
        kind: TransactionKind,
        reference: Option<&str>,
        note: Option<&str>,
        operator_id: &str,
    ) -> StorageResult<DecrementOutcome> {
        let quantity = round_quantity(quantity);
        let existing = self.storage.get_stock_txn(txn, product_id, location_id)?;

        let available = existing
            .as_ref()
            .map(|r| r.current_stock)
            .unwrap_or(Decimal::ZERO);

        if quantity <= Decimal::ZERO || available < quantity {
            return Ok(DecrementOutcome {
                applied: Decimal::ZERO,
                balance: available,
            });
        }

        let balance = round_quantity(available - quantity);
        let record = StockRecord {
            product_id: product_id.to_string(),
            location_id: location_id.to_string(),
            current_stock: balance,
            reorder_level: existing.map(|r| r.reorder_level).unwrap_or(Decimal::ZERO),
            updated_at: now_millis(),
        };
        self.storage.put_stock_txn(txn, &record)?;

        self.append_row(
            txn,
            product_id,
            location_id,
            -quantity,
            kind,
            reference,
            note,
            operator_id,
        )?;

        Ok(DecrementOutcome {
            applied: quantity,
            balance,
        })
    }

    /// Increment stock, creating the record if missing. Returns the new
    /// balance.
    #[allow(clippy::too_many_arguments)]
    pub fn increment(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        location_id: &str,
        quantity: Decimal,
        kind: TransactionKind,
        reference: Option<&str>,
        note: Option<&str>,
        operator_id: &str,
    ) -> StorageResult<Decimal> {
        let quantity = round_quantity(quantity);
        let existing = self.storage.get_stock_txn(txn, product_id, location_id)?;

        let balance = round_quantity(
            existing
                .as_ref()
                .map(|r| r.current_stock)
                .unwrap_or(Decimal::ZERO)
                + quantity,
        );

        let record = StockRecord {
            product_id: product_id.to_string(),
            location_id: location_id.to_string(),
            current_stock: balance,
            reorder_level: existing.map(|r| r.reorder_level).unwrap_or(Decimal::ZERO),
            updated_at: now_millis(),
        };
        self.storage.put_stock_txn(txn, &record)?;

        if quantity > Decimal::ZERO {
            self.append_row(
                txn,
                product_id,
                location_id,
                quantity,
                kind,
                reference,
                note,
                operator_id,
            )?;
        }

        Ok(balance)
    }

    #[allow(clippy::too_many_arguments)]
    fn append_row(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        location_id: &str,
        quantity: Decimal,
        kind: TransactionKind,
        reference: Option<&str>,
        note: Option<&str>,
        operator_id: &str,
    ) -> StorageResult<u64> {
        let row = InventoryTransaction {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            location_id: location_id.to_string(),
            quantity,
            kind,
            reference: reference.map(str::to_string),
            note: note.map(str::to_string),
            operator_id: operator_id.to_string(),
            timestamp: now_millis(),
        };
        self.storage.append_inventory_transaction(txn, &row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_stock(storage: &OrderStorage, product_id: &str, stock: Decimal) {
        let txn = storage.begin_write().unwrap();
        storage
            .put_stock_txn(
                &txn,
                &StockRecord {
                    product_id: product_id.to_string(),
                    location_id: "loc-1".to_string(),
                    current_stock: stock,
                    reorder_level: Decimal::ZERO,
                    updated_at: now_millis(),
                },
            )
            .unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_decrement_full_availability() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed_stock(&storage, "p-1", Decimal::new(1200, 3));

        let txn = storage.begin_write().unwrap();
        let ledger = StockLedger::new(&storage);
        let outcome = ledger
            .try_decrement(
                &txn,
                "p-1",
                "loc-1",
                Decimal::new(1000, 3),
                TransactionKind::Sale,
                Some("ORD-1"),
                None,
                "op-1",
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(outcome.applied, Decimal::new(1000, 3));
        assert_eq!(outcome.balance, Decimal::new(200, 3));
        assert!(outcome.succeeded());

        let rows = storage.get_transactions_for_product("p-1", "loc-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity, Decimal::new(-1000, 3));
        assert_eq!(rows[0].kind, TransactionKind::Sale);
    }

    #[test]
    fn test_decrement_rejected_on_shortfall() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed_stock(&storage, "p-1", Decimal::new(300, 3));

        let txn = storage.begin_write().unwrap();
        let ledger = StockLedger::new(&storage);
        let outcome = ledger
            .try_decrement(
                &txn,
                "p-1",
                "loc-1",
                Decimal::ONE,
                TransactionKind::Sale,
                None,
                None,
                "op-1",
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(outcome.applied, Decimal::ZERO);
        assert_eq!(outcome.balance, Decimal::new(300, 3));
        assert!(!outcome.succeeded());

        // Stock and ledger both untouched
        let stock = storage.get_stock("p-1", "loc-1").unwrap().unwrap();
        assert_eq!(stock.current_stock, Decimal::new(300, 3));
        assert!(storage
            .get_transactions_for_product("p-1", "loc-1")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_decrement_missing_record_writes_nothing() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let ledger = StockLedger::new(&storage);
        let outcome = ledger
            .try_decrement(
                &txn,
                "ghost",
                "loc-1",
                Decimal::ONE,
                TransactionKind::Sale,
                None,
                None,
                "op-1",
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(outcome.applied, Decimal::ZERO);
        assert_eq!(outcome.balance, Decimal::ZERO);
        assert!(storage.get_stock("ghost", "loc-1").unwrap().is_none());
        assert!(storage
            .get_transactions_for_product("ghost", "loc-1")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_increment_creates_record() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let ledger = StockLedger::new(&storage);
        let balance = ledger
            .increment(
                &txn,
                "p-9",
                "loc-1",
                Decimal::new(5000, 3),
                TransactionKind::Purchase,
                None,
                Some("initial delivery"),
                "op-1",
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(balance, Decimal::new(5000, 3));
        let record = storage.get_stock("p-9", "loc-1").unwrap().unwrap();
        assert_eq!(record.current_stock, Decimal::new(5000, 3));

        let rows = storage.get_transactions_for_product("p-9", "loc-1").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, TransactionKind::Purchase);
        assert_eq!(rows[0].quantity, Decimal::new(5000, 3));
    }

    #[test]
    fn test_return_restores_balance() {
        let storage = OrderStorage::open_in_memory().unwrap();
        seed_stock(&storage, "p-1", Decimal::new(1000, 3));

        let txn = storage.begin_write().unwrap();
        let ledger = StockLedger::new(&storage);
        ledger
            .try_decrement(
                &txn,
                "p-1",
                "loc-1",
                Decimal::new(600, 3),
                TransactionKind::Sale,
                Some("ORD-1"),
                None,
                "op-1",
            )
            .unwrap();
        let balance = ledger
            .increment(
                &txn,
                "p-1",
                "loc-1",
                Decimal::new(600, 3),
                TransactionKind::Return,
                Some("ORD-1"),
                None,
                "op-1",
            )
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(balance, Decimal::new(1000, 3));
        let rows = storage.get_transactions_for_reference("ORD-1").unwrap();
        assert_eq!(rows.len(), 2);
    }
}
