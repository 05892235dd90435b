//! Shared domain types for the order fulfillment engine.
//!
//! This crate holds the pure data model: catalog entities, inventory
//! ledger types, order commands/events/snapshots, and the command
//! response surface. No persistence or runtime code lives here.

pub mod models;
pub mod order;
pub mod util;
