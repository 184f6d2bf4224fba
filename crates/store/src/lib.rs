//! `supplyline-store` — persistence behind one [`Store`] trait.
//!
//! Two backends: [`MemoryStore`] for tests and quick local runs, and
//! [`PgStore`] for real deployments. Both enforce the same invariants
//! through the pure planners in the domain crates, so swapping one for
//! the other never changes observable behavior.

pub mod memory;
pub mod postgres;
pub mod store;
pub mod views;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{OrderDraft, ReceiveOrder, RecordMovement, Store, UpsertItem};
pub use views::{DashboardStats, ItemView, MovementView, OrderItemView, OrderView};
