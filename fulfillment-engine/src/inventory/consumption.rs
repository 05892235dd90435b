//! Best-effort inventory consumption for order lines.
//!
//! Consumption never fails an order: each ingredient is decremented
//! independently, and one that cannot be covered in full is left
//! untouched and reported as a shortfall. Each line is consumed at
//! most once; the guard lives on the line snapshot.

use redb::WriteTransaction;
use rust_decimal::Decimal;

use crate::catalog::CatalogService;
use crate::inventory::ledger::StockLedger;
use crate::inventory::resolver::resolve_line_requirements;
use crate::orders::storage::{OrderStorage, StorageResult};
use shared::models::{ConsumedIngredient, StockShortfall, TransactionKind};
use shared::order::LineSnapshot;

/// Outcome of consuming one line
#[derive(Debug, Clone, Default)]
pub struct ConsumptionResult {
    pub line_id: String,
    pub consumed: Vec<ConsumedIngredient>,
    pub shortfalls: Vec<StockShortfall>,
}

/// Consumes ingredients for order lines against the stock ledger
pub struct InventoryConsumptionService<'a> {
    storage: &'a OrderStorage,
    catalog: &'a CatalogService,
}

impl<'a> InventoryConsumptionService<'a> {
    pub fn new(storage: &'a OrderStorage, catalog: &'a CatalogService) -> Self {
        Self { storage, catalog }
    }

    /// Consume a line's ingredients at the given location.
    ///
    /// Idempotent: a line already marked consumed returns its recorded
    /// consumption without touching stock again. Each ingredient is
    /// decremented independently; a shortfall on one never blocks the
    /// others.
    pub fn consume_line(
        &self,
        txn: &WriteTransaction,
        line: &LineSnapshot,
        location_id: &str,
        order_number: &str,
        operator_id: &str,
    ) -> StorageResult<ConsumptionResult> {
        if line.inventory_consumed {
            return Ok(ConsumptionResult {
                line_id: line.line_id.clone(),
                consumed: line.consumed.clone(),
                shortfalls: Vec::new(),
            });
        }

        let requirements = resolve_line_requirements(line, self.catalog);
        let ledger = StockLedger::new(self.storage);

        let mut consumed = Vec::new();
        let mut shortfalls = Vec::new();

        for req in requirements {
            let outcome = ledger.try_decrement(
                txn,
                &req.product_id,
                location_id,
                req.quantity,
                TransactionKind::Sale,
                Some(order_number),
                None,
                operator_id,
            )?;

            if outcome.succeeded() {
                consumed.push(ConsumedIngredient {
                    product_id: req.product_id.clone(),
                    quantity: outcome.applied,
                    unit: req.unit.clone(),
                });
            } else {
                tracing::warn!(
                    product_id = %req.product_id,
                    location_id = %location_id,
                    order_number = %order_number,
                    requested = %req.quantity,
                    available = %outcome.balance,
                    "Insufficient stock, recording shortfall"
                );
                shortfalls.push(StockShortfall {
                    product_id: req.product_id,
                    location_id: location_id.to_string(),
                    requested: req.quantity,
                    available: outcome.balance,
                });
            }
        }

        Ok(ConsumptionResult {
            line_id: line.line_id.clone(),
            consumed,
            shortfalls,
        })
    }

    /// Check availability for a line without touching stock.
    ///
    /// Used as a pre-check before confirmation; returns one shortfall
    /// per ingredient that cannot be covered in full.
    pub fn check_line_availability(
        &self,
        txn: &WriteTransaction,
        line: &LineSnapshot,
        location_id: &str,
    ) -> StorageResult<Vec<StockShortfall>> {
        if line.inventory_consumed {
            return Ok(Vec::new());
        }

        let requirements = resolve_line_requirements(line, self.catalog);
        let mut shortfalls = Vec::new();

        for req in requirements {
            let available = self
                .storage
                .get_stock_txn(txn, &req.product_id, location_id)?
                .map(|r| r.current_stock)
                .unwrap_or(Decimal::ZERO);
            if available < req.quantity {
                shortfalls.push(StockShortfall {
                    product_id: req.product_id,
                    location_id: location_id.to_string(),
                    requested: req.quantity,
                    available,
                });
            }
        }

        Ok(shortfalls)
    }
}
