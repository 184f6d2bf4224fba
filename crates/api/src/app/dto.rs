use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use supplyline_auth::Role;
use supplyline_catalog::{
    NewProduct, NewSupplier, NewWarehouse, ProductUpdate, SupplierUpdate, WarehouseKind,
    WarehouseUpdate,
};
use supplyline_core::{
    DomainError, DomainResult, InventoryItemId, OrderItemId, ProductId, SupplierId, WarehouseId,
};
use supplyline_inventory::MovementType;
use supplyline_purchasing::{OrderItemRequest, OrderStatus, ReceiptLine};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub safety_stock: Option<i32>,
}

impl CreateProductRequest {
    pub fn into_input(self) -> DomainResult<NewProduct> {
        Ok(NewProduct {
            sku: self.sku,
            name: self.name,
            category: self.category,
            price: money(self.price)?,
            safety_stock: self.safety_stock.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub safety_stock: Option<i32>,
}

impl UpdateProductRequest {
    pub fn into_update(self) -> DomainResult<ProductUpdate> {
        Ok(ProductUpdate {
            sku: self.sku,
            name: self.name,
            category: self.category,
            price: self.price.map(money).transpose()?,
            safety_stock: self.safety_stock,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
}

impl CreateSupplierRequest {
    pub fn into_input(self) -> NewSupplier {
        NewSupplier {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            contact_person: self.contact_person,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
}

impl UpdateSupplierRequest {
    pub fn into_update(self) -> SupplierUpdate {
        SupplierUpdate {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            contact_person: self.contact_person,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<WarehouseKind>,
    #[serde(default)]
    pub capacity: Option<i32>,
}

impl CreateWarehouseRequest {
    pub fn into_input(self) -> NewWarehouse {
        NewWarehouse {
            name: self.name,
            location: self.location,
            kind: self.kind,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<WarehouseKind>,
    #[serde(default)]
    pub capacity: Option<i32>,
}

impl UpdateWarehouseRequest {
    pub fn into_update(self) -> WarehouseUpdate {
        WarehouseUpdate {
            name: self.name,
            location: self.location,
            kind: self.kind,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertInventoryRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i32,
    #[serde(default)]
    pub reserved: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    pub new_quantity: i32,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementRequest {
    pub inventory_item_id: InventoryItemId,
    pub movement_type: MovementType,
    pub quantity: i32,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub reference_type: Option<String>,
    #[serde(default)]
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequestDto {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

impl OrderItemRequestDto {
    pub fn into_input(self) -> DomainResult<OrderItemRequest> {
        Ok(OrderItemRequest {
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price.map(money).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub supplier_id: SupplierId,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub items: Vec<OrderItemRequestDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub supplier_id: SupplierId,
    #[serde(default)]
    pub expected_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<OrderItemRequestDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveLineDto {
    pub purchase_order_item_id: OrderItemId,
    pub quantity_received: i32,
}

impl ReceiveLineDto {
    pub fn into_input(self) -> ReceiptLine {
        ReceiptLine {
            purchase_order_item_id: self.purchase_order_item_id,
            quantity_received: self.quantity_received,
        }
    }
}

/// Body of `POST /purchase-orders/:id/receive`. Clients may send a `notes`
/// field; it is accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveItemsRequest {
    pub items: Vec<ReceiveLineDto>,
    pub warehouse_id: WarehouseId,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

// -------------------------
// Mapping helpers
// -------------------------

/// Money arrives as a JSON number; everything past the edge is `Decimal`.
pub fn money(value: f64) -> DomainResult<Decimal> {
    Decimal::try_from(value).map_err(|_| DomainError::validation("invalid money amount"))
}

pub fn order_items(items: Vec<OrderItemRequestDto>) -> DomainResult<Vec<OrderItemRequest>> {
    items.into_iter().map(OrderItemRequestDto::into_input).collect()
}
