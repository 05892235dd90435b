//! Order fulfillment and inventory consumption engine.
//!
//! Drives an order through its lifecycle, deducts consumed ingredients
//! from per-location stock via an append-only ledger, and reconciles
//! payments against the order total. Commands enter through
//! [`orders::manager::OrdersManager`]; every logical operation runs in a
//! single storage transaction.

pub mod catalog;
pub mod inventory;
pub mod money;
pub mod orders;

pub use catalog::CatalogService;
pub use orders::manager::OrdersManager;
