//! `supplyline-catalog` — master data: products, suppliers, warehouses.
//!
//! Pure entity types and field validation. Uniqueness (SKU, supplier email,
//! warehouse name) is enforced at the store seam where all rows are visible.

pub mod product;
pub mod supplier;
pub mod warehouse;

pub use product::{NewProduct, Product, ProductUpdate};
pub use supplier::{NewSupplier, Supplier, SupplierUpdate};
pub use warehouse::{NewWarehouse, Warehouse, WarehouseKind, WarehouseUpdate, DEFAULT_CAPACITY};
