//! Denormalized read shapes returned by the store.
//!
//! Handlers serve these directly; every join the client would otherwise
//! perform (SKU on a stock row, supplier name on an order) is resolved
//! here, inside the same consistent view of the data that produced the row.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use supplyline_core::{
    InventoryItemId, MovementId, OrderItemId, ProductId, PurchaseOrderId, SupplierId, UserId,
    WarehouseId,
};
use supplyline_inventory::MovementType;
use supplyline_purchasing::OrderStatus;

/// A stock row joined with its product and warehouse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: InventoryItemId,
    pub product_id: ProductId,
    pub product_sku: String,
    pub product_name: String,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub last_updated: DateTime<Utc>,
}

/// A ledger entry joined with the stock row it touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementView {
    pub id: MovementId,
    pub inventory_item_id: InventoryItemId,
    pub product_sku: String,
    pub product_name: String,
    pub warehouse_name: String,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub quantity_before: i32,
    pub quantity_after: i32,
    pub reason: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub performed_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An order line joined with its product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_sku: String,
    pub product_name: String,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A purchase order joined with its supplier, author and lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: PurchaseOrderId,
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub created_by_id: Option<UserId>,
    pub created_by_name: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub expected_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

/// Aggregates behind the dashboard endpoint.
///
/// String fields fall back to `"-"` when the underlying table is empty so
/// the dashboard never renders a hole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_suppliers: u64,
    pub total_products: u64,
    pub total_warehouses: u64,
    pub total_purchase_orders: u64,
    pub best_supplier_name: String,
    pub best_supplier_total_amount: Decimal,
    pub most_stocked_product: String,
    pub most_stocked_quantity: i64,
    pub least_stocked_product: String,
    pub least_stocked_quantity: i64,
    pub low_stock_products: Vec<String>,
}

impl DashboardStats {
    /// Placeholder shown where no data exists yet.
    pub const NONE: &'static str = "-";

    pub fn empty() -> Self {
        Self {
            total_suppliers: 0,
            total_products: 0,
            total_warehouses: 0,
            total_purchase_orders: 0,
            best_supplier_name: Self::NONE.to_string(),
            best_supplier_total_amount: Decimal::ZERO,
            most_stocked_product: Self::NONE.to_string(),
            most_stocked_quantity: 0,
            least_stocked_product: Self::NONE.to_string(),
            least_stocked_quantity: 0,
            low_stock_products: Vec::new(),
        }
    }
}
