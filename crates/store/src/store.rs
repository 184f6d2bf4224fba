//! The persistence seam.
//!
//! Handlers talk to an `Arc<dyn Store>`; everything behind it is swappable.
//! Mutations that touch more than one row (receipts, cascaded deletes,
//! ledger writes) happen atomically inside the implementation: the memory
//! backend holds one lock across the whole operation, the Postgres backend
//! wraps it in a transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use supplyline_auth::User;
use supplyline_catalog::{
    Product, ProductUpdate, Supplier, SupplierUpdate, Warehouse, WarehouseUpdate,
};
use supplyline_core::{
    DomainError, DomainResult, InventoryItemId, MovementId, Page, PageQuery, ProductId,
    PurchaseOrderId, SupplierId, UserId, WarehouseId,
};
use supplyline_inventory::MovementType;
use supplyline_purchasing::{OrderItemRequest, OrderStatus, ReceiptLine};

use crate::views::{DashboardStats, ItemView, MovementView, OrderView};

/// Create-or-update request for a stock row, keyed on (product, warehouse).
///
/// Writing through this path sets the counters directly and leaves no
/// ledger entry; callers that need an audit trail go through
/// [`Store::adjust_item`] or [`Store::record_movement`] instead.
#[derive(Debug, Clone)]
pub struct UpsertItem {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i32,
    pub reserved: i32,
}

impl UpsertItem {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.reserved < 0 {
            return Err(DomainError::validation("reserved cannot be negative"));
        }
        Ok(())
    }
}

/// A manual ledger write against an existing stock row.
#[derive(Debug, Clone)]
pub struct RecordMovement {
    pub inventory_item_id: InventoryItemId,
    pub movement_type: MovementType,
    /// Signed for `ADJUSTMENT`/`TRANSFER`, strictly positive for `IN`/`OUT`.
    pub quantity: i32,
    pub reason: Option<String>,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    pub performed_by: Option<UserId>,
}

/// The caller-supplied half of a purchase order.
///
/// `created_by` is honored on create and ignored on update; the original
/// author sticks.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub supplier_id: SupplierId,
    pub expected_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub items: Vec<OrderItemRequest>,
    pub created_by: Option<UserId>,
}

/// A receipt against a `SENT` order: which lines arrived and where to
/// put the stock.
#[derive(Debug, Clone)]
pub struct ReceiveOrder {
    pub warehouse_id: WarehouseId,
    pub lines: Vec<ReceiptLine>,
    pub performed_by: Option<UserId>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // -- users ------------------------------------------------------------

    /// Insert a new account. Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: User) -> DomainResult<User>;
    async fn user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn user(&self, id: UserId) -> DomainResult<User>;

    // -- products ---------------------------------------------------------

    /// Insert a new product. Fails with `Conflict` when the SKU is taken.
    async fn insert_product(&self, product: Product) -> DomainResult<Product>;
    async fn product(&self, id: ProductId) -> DomainResult<Product>;
    /// Page through products, optionally filtered by a case-insensitive
    /// substring match on SKU or name.
    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<Product>>;
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> DomainResult<Product>;
    /// Delete a product. Fails with `Conflict` while stock rows or order
    /// lines still reference it.
    async fn delete_product(&self, id: ProductId) -> DomainResult<()>;

    // -- suppliers --------------------------------------------------------

    async fn insert_supplier(&self, supplier: Supplier) -> DomainResult<Supplier>;
    async fn supplier(&self, id: SupplierId) -> DomainResult<Supplier>;
    async fn list_suppliers(&self, search: Option<&str>) -> DomainResult<Vec<Supplier>>;
    async fn update_supplier(
        &self,
        id: SupplierId,
        update: SupplierUpdate,
    ) -> DomainResult<Supplier>;
    /// Delete a supplier. Fails with `Conflict` while purchase orders still
    /// reference it.
    async fn delete_supplier(&self, id: SupplierId) -> DomainResult<()>;

    // -- warehouses -------------------------------------------------------

    async fn insert_warehouse(&self, warehouse: Warehouse) -> DomainResult<Warehouse>;
    async fn warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse>;
    async fn list_warehouses(&self, search: Option<&str>) -> DomainResult<Vec<Warehouse>>;
    async fn update_warehouse(
        &self,
        id: WarehouseId,
        update: WarehouseUpdate,
    ) -> DomainResult<Warehouse>;
    /// Delete a warehouse together with its stock rows and their ledger.
    async fn delete_warehouse(&self, id: WarehouseId) -> DomainResult<()>;

    // -- inventory --------------------------------------------------------

    /// Create or overwrite the stock row for (product, warehouse).
    async fn upsert_item(&self, input: UpsertItem) -> DomainResult<ItemView>;
    async fn item(&self, id: InventoryItemId) -> DomainResult<ItemView>;
    async fn list_items(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<ItemView>>;
    async fn items_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<ItemView>>;
    async fn items_by_product(&self, product_id: ProductId) -> DomainResult<Vec<ItemView>>;
    /// Rows at or below their product's safety stock.
    async fn low_stock_items(&self) -> DomainResult<Vec<ItemView>>;
    /// Rows with nothing left to promise (`quantity - reserved <= 0`).
    async fn out_of_stock_items(&self) -> DomainResult<Vec<ItemView>>;
    /// Set an item's on-hand quantity to an absolute value, writing the
    /// delta to the ledger.
    async fn adjust_item(
        &self,
        id: InventoryItemId,
        new_quantity: i32,
        reason: Option<String>,
        performed_by: Option<UserId>,
    ) -> DomainResult<ItemView>;
    /// Delete a stock row together with its ledger entries.
    async fn delete_item(&self, id: InventoryItemId) -> DomainResult<()>;

    // -- movements --------------------------------------------------------

    /// Apply a movement to its stock row and append it to the ledger.
    async fn record_movement(&self, input: RecordMovement) -> DomainResult<MovementView>;
    async fn movement(&self, id: MovementId) -> DomainResult<MovementView>;
    /// Page through the ledger, newest first.
    async fn list_movements(&self, query: PageQuery) -> DomainResult<Page<MovementView>>;
    async fn movements_by_item(
        &self,
        item_id: InventoryItemId,
    ) -> DomainResult<Vec<MovementView>>;
    async fn movements_by_type(
        &self,
        movement_type: MovementType,
    ) -> DomainResult<Vec<MovementView>>;
    async fn movements_by_product(&self, product_id: ProductId)
        -> DomainResult<Vec<MovementView>>;
    async fn movements_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Vec<MovementView>>;
    async fn movements_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<MovementView>>;

    // -- purchase orders --------------------------------------------------

    /// Create an order, numbering it within the current month.
    async fn create_order(&self, draft: OrderDraft) -> DomainResult<OrderView>;
    async fn order(&self, id: PurchaseOrderId) -> DomainResult<OrderView>;
    /// Page through orders, newest first.
    async fn list_orders(&self, query: PageQuery) -> DomainResult<Page<OrderView>>;
    async fn orders_by_status(&self, status: OrderStatus) -> DomainResult<Vec<OrderView>>;
    async fn orders_by_supplier(&self, supplier_id: SupplierId) -> DomainResult<Vec<OrderView>>;
    /// Replace the lines and header of a `DRAFT` order.
    async fn update_order(&self, id: PurchaseOrderId, draft: OrderDraft)
        -> DomainResult<OrderView>;
    async fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> DomainResult<OrderView>;
    /// Book received quantities against a `SENT` order, restock the target
    /// warehouse and write one `IN` ledger entry per received line.
    async fn receive_order(
        &self,
        id: PurchaseOrderId,
        receipt: ReceiveOrder,
    ) -> DomainResult<OrderView>;
    /// Delete a `DRAFT` order together with its lines.
    async fn delete_order(&self, id: PurchaseOrderId) -> DomainResult<()>;

    // -- dashboard --------------------------------------------------------

    async fn dashboard_stats(&self) -> DomainResult<DashboardStats>;
}
