//! `supplyline-inventory` — stock levels and the append-only movement trail.
//!
//! Entities plus pure ledger arithmetic. Nothing here touches storage; the
//! store crate applies validated [`ledger::StockChange`] plans atomically.

pub mod item;
pub mod ledger;
pub mod movement;

pub use item::InventoryItem;
pub use ledger::{plan_movement, plan_set_quantity, StockChange};
pub use movement::{reference, InventoryMovement, MovementType};
