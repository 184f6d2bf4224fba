//! `supplyline-purchasing` — purchase order lifecycle and receipt
//! reconciliation.
//!
//! The status machine and the receipt planner are pure; the store applies
//! their outputs inside one unit of work.

pub mod order;
pub mod receipt;
pub mod status;

pub use order::{
    order_number, resolve_item, OrderItemRequest, PurchaseOrder, PurchaseOrderItem,
};
pub use receipt::{plan_receipt, LineReceipt, ReceiptLine, ReceiptPlan};
pub use status::OrderStatus;
