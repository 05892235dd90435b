//! Inventory subsystem: stock ledger, recipe resolution, consumption.

pub mod consumption;
pub mod ledger;
pub mod resolver;

pub use consumption::{ConsumptionResult, InventoryConsumptionService};
pub use ledger::{DecrementOutcome, StockLedger};
pub use resolver::resolve_line_requirements;
