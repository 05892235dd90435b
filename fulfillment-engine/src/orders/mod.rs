//! Order engine: commands in, events out, snapshots as current state.

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod reducer;
pub mod storage;
pub mod traits;
