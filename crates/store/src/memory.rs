//! In-memory backend for tests and dev.
//!
//! All tables live behind one `RwLock`; every operation takes the lock
//! exactly once and never awaits while holding it, so each call is a
//! serial critical section and multi-row mutations are atomic for free.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use supplyline_auth::User;
use supplyline_catalog::{
    Product, ProductUpdate, Supplier, SupplierUpdate, Warehouse, WarehouseUpdate,
};
use supplyline_core::{
    DomainError, DomainResult, InventoryItemId, MovementId, Page, PageQuery, ProductId,
    PurchaseOrderId, SupplierId, UserId, WarehouseId,
};
use supplyline_inventory::{
    InventoryItem, InventoryMovement, MovementType, plan_movement, plan_set_quantity, reference,
};
use supplyline_purchasing::{
    OrderItemRequest, OrderStatus, PurchaseOrder, PurchaseOrderItem, order_number, plan_receipt,
    resolve_item,
};

use crate::store::{OrderDraft, ReceiveOrder, RecordMovement, Store, UpsertItem};
use crate::views::{DashboardStats, ItemView, MovementView, OrderItemView, OrderView};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    products: HashMap<ProductId, Product>,
    suppliers: HashMap<SupplierId, Supplier>,
    warehouses: HashMap<WarehouseId, Warehouse>,
    items: HashMap<InventoryItemId, InventoryItem>,
    /// Append-only; insertion order is chronological.
    movements: Vec<InventoryMovement>,
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
}

impl Tables {
    fn item_view(&self, item: &InventoryItem) -> DomainResult<ItemView> {
        let product = self
            .products
            .get(&item.product_id)
            .ok_or_else(|| DomainError::storage("stock row references a missing product"))?;
        let warehouse = self
            .warehouses
            .get(&item.warehouse_id)
            .ok_or_else(|| DomainError::storage("stock row references a missing warehouse"))?;
        Ok(ItemView {
            id: item.id,
            product_id: product.id,
            product_sku: product.sku.clone(),
            product_name: product.name.clone(),
            warehouse_id: warehouse.id,
            warehouse_name: warehouse.name.clone(),
            quantity: item.quantity,
            reserved: item.reserved,
            available: item.available(),
            last_updated: item.last_updated,
        })
    }

    fn movement_view(&self, movement: &InventoryMovement) -> DomainResult<MovementView> {
        let item = self
            .items
            .get(&movement.inventory_item_id)
            .ok_or_else(|| DomainError::storage("ledger entry references a missing stock row"))?;
        let product = self
            .products
            .get(&item.product_id)
            .ok_or_else(|| DomainError::storage("stock row references a missing product"))?;
        let warehouse = self
            .warehouses
            .get(&item.warehouse_id)
            .ok_or_else(|| DomainError::storage("stock row references a missing warehouse"))?;
        let performed_by_name = movement
            .performed_by
            .and_then(|id| self.users.get(&id))
            .map(User::full_name);
        Ok(MovementView {
            id: movement.id,
            inventory_item_id: movement.inventory_item_id,
            product_sku: product.sku.clone(),
            product_name: product.name.clone(),
            warehouse_name: warehouse.name.clone(),
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            quantity_before: movement.quantity_before,
            quantity_after: movement.quantity_after,
            reason: movement.reason.clone(),
            reference_type: movement.reference_type.clone(),
            reference_id: movement.reference_id.clone(),
            performed_by_name,
            created_at: movement.created_at,
        })
    }

    fn order_view(&self, order: &PurchaseOrder) -> DomainResult<OrderView> {
        let supplier = self
            .suppliers
            .get(&order.supplier_id)
            .ok_or_else(|| DomainError::storage("order references a missing supplier"))?;
        let created_by_name = order
            .created_by
            .and_then(|id| self.users.get(&id))
            .map(User::full_name);
        let items = order
            .items
            .iter()
            .map(|line| {
                let product = self.products.get(&line.product_id).ok_or_else(|| {
                    DomainError::storage("order line references a missing product")
                })?;
                Ok(OrderItemView {
                    id: line.id,
                    product_id: line.product_id,
                    product_sku: product.sku.clone(),
                    product_name: product.name.clone(),
                    quantity_ordered: line.quantity_ordered,
                    quantity_received: line.quantity_received,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(OrderView {
            id: order.id,
            order_number: order.order_number.clone(),
            supplier_id: order.supplier_id,
            supplier_name: supplier.name.clone(),
            created_by_id: order.created_by,
            created_by_name,
            status: order.status,
            total_amount: order.total_amount,
            expected_date: order.expected_date,
            created_at: order.created_at,
            items,
        })
    }

    /// Resolve requested order lines against the catalog.
    fn resolve_lines(
        &self,
        requests: &[OrderItemRequest],
    ) -> DomainResult<Vec<PurchaseOrderItem>> {
        requests
            .iter()
            .map(|request| {
                let product = self
                    .products
                    .get(&request.product_id)
                    .ok_or_else(|| {
                        DomainError::not_found(format!("product {}", request.product_id))
                    })?;
                resolve_item(request, product)
            })
            .collect()
    }

    /// Next free order number; the global count seeds the sequence and
    /// collisions left by deletions are skipped over.
    fn next_order_number(&self, now: DateTime<Utc>) -> String {
        let mut sequence = self.orders.len() as u64 + 1;
        loop {
            let candidate = order_number(now, sequence);
            if !self.orders.values().any(|o| o.order_number == candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }

}

/// Volatile [`Store`] backed by process memory.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| DomainError::storage("store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| DomainError::storage("store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // -- users ------------------------------------------------------------

    async fn insert_user(&self, user: User) -> DomainResult<User> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict(
                "an account with this email already exists",
            ));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let tables = self.read()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user(&self, id: UserId) -> DomainResult<User> {
        let tables = self.read()?;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))
    }

    // -- products ---------------------------------------------------------

    async fn insert_product(&self, product: Product) -> DomainResult<Product> {
        let mut tables = self.write()?;
        if tables.products.values().any(|p| p.sku == product.sku) {
            return Err(DomainError::conflict(format!(
                "a product with SKU {} already exists",
                product.sku
            )));
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> DomainResult<Product> {
        let tables = self.read()?;
        tables
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<Product>> {
        let tables = self.read()?;
        let needle = search.map(str::to_lowercase);
        let mut all: Vec<Product> = tables
            .products
            .values()
            .filter(|p| match &needle {
                Some(n) => {
                    p.sku.to_lowercase().contains(n) || p.name.to_lowercase().contains(n)
                }
                None => true,
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(Page::slice(all, &query))
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> DomainResult<Product> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Err(DomainError::not_found(format!("product {id}")));
        }
        if let Some(sku) = &update.sku {
            let sku = sku.trim();
            if tables.products.values().any(|p| p.id != id && p.sku == sku) {
                return Err(DomainError::conflict(format!(
                    "a product with SKU {sku} already exists"
                )));
            }
        }
        let now = Utc::now();
        match tables.products.get_mut(&id) {
            Some(product) => {
                product.apply_update(update, now)?;
                Ok(product.clone())
            }
            None => Err(DomainError::not_found(format!("product {id}"))),
        }
    }

    async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Err(DomainError::not_found(format!("product {id}")));
        }
        if tables.items.values().any(|i| i.product_id == id) {
            return Err(DomainError::conflict(
                "product still has inventory records",
            ));
        }
        if tables
            .orders
            .values()
            .any(|o| o.items.iter().any(|l| l.product_id == id))
        {
            return Err(DomainError::conflict(
                "product is referenced by purchase orders",
            ));
        }
        tables.products.remove(&id);
        Ok(())
    }

    // -- suppliers --------------------------------------------------------

    async fn insert_supplier(&self, supplier: Supplier) -> DomainResult<Supplier> {
        let mut tables = self.write()?;
        if let Some(email) = &supplier.email {
            if tables
                .suppliers
                .values()
                .any(|s| s.email.as_deref() == Some(email.as_str()))
            {
                return Err(DomainError::conflict(format!(
                    "a supplier with email {email} already exists"
                )));
            }
        }
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn supplier(&self, id: SupplierId) -> DomainResult<Supplier> {
        let tables = self.read()?;
        tables
            .suppliers
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))
    }

    async fn list_suppliers(&self, search: Option<&str>) -> DomainResult<Vec<Supplier>> {
        let tables = self.read()?;
        let needle = search.map(str::to_lowercase);
        let mut all: Vec<Supplier> = tables
            .suppliers
            .values()
            .filter(|s| match &needle {
                Some(n) => {
                    s.name.to_lowercase().contains(n)
                        || s.email
                            .as_deref()
                            .is_some_and(|e| e.to_lowercase().contains(n))
                }
                None => true,
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(all)
    }

    async fn update_supplier(
        &self,
        id: SupplierId,
        update: SupplierUpdate,
    ) -> DomainResult<Supplier> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&id) {
            return Err(DomainError::not_found(format!("supplier {id}")));
        }
        if let Some(email) = &update.email {
            let email = email.trim();
            if !email.is_empty()
                && tables
                    .suppliers
                    .values()
                    .any(|s| s.id != id && s.email.as_deref() == Some(email))
            {
                return Err(DomainError::conflict(format!(
                    "a supplier with email {email} already exists"
                )));
            }
        }
        match tables.suppliers.get_mut(&id) {
            Some(supplier) => {
                supplier.apply_update(update)?;
                Ok(supplier.clone())
            }
            None => Err(DomainError::not_found(format!("supplier {id}"))),
        }
    }

    async fn delete_supplier(&self, id: SupplierId) -> DomainResult<()> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&id) {
            return Err(DomainError::not_found(format!("supplier {id}")));
        }
        if tables.orders.values().any(|o| o.supplier_id == id) {
            return Err(DomainError::conflict(
                "supplier is referenced by purchase orders",
            ));
        }
        tables.suppliers.remove(&id);
        Ok(())
    }

    // -- warehouses -------------------------------------------------------

    async fn insert_warehouse(&self, warehouse: Warehouse) -> DomainResult<Warehouse> {
        let mut tables = self.write()?;
        if tables.warehouses.values().any(|w| w.name == warehouse.name) {
            return Err(DomainError::conflict(format!(
                "a warehouse named {} already exists",
                warehouse.name
            )));
        }
        tables.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse)
    }

    async fn warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        let tables = self.read()?;
        tables
            .warehouses
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))
    }

    async fn list_warehouses(&self, search: Option<&str>) -> DomainResult<Vec<Warehouse>> {
        let tables = self.read()?;
        let needle = search.map(str::to_lowercase);
        let mut all: Vec<Warehouse> = tables
            .warehouses
            .values()
            .filter(|w| match &needle {
                Some(n) => {
                    w.name.to_lowercase().contains(n)
                        || w.location
                            .as_deref()
                            .is_some_and(|l| l.to_lowercase().contains(n))
                }
                None => true,
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(all)
    }

    async fn update_warehouse(
        &self,
        id: WarehouseId,
        update: WarehouseUpdate,
    ) -> DomainResult<Warehouse> {
        let mut tables = self.write()?;
        if !tables.warehouses.contains_key(&id) {
            return Err(DomainError::not_found(format!("warehouse {id}")));
        }
        if let Some(name) = &update.name {
            let name = name.trim();
            if tables.warehouses.values().any(|w| w.id != id && w.name == name) {
                return Err(DomainError::conflict(format!(
                    "a warehouse named {name} already exists"
                )));
            }
        }
        match tables.warehouses.get_mut(&id) {
            Some(warehouse) => {
                warehouse.apply_update(update)?;
                Ok(warehouse.clone())
            }
            None => Err(DomainError::not_found(format!("warehouse {id}"))),
        }
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> DomainResult<()> {
        let mut tables = self.write()?;
        if !tables.warehouses.contains_key(&id) {
            return Err(DomainError::not_found(format!("warehouse {id}")));
        }
        let removed: Vec<InventoryItemId> = tables
            .items
            .values()
            .filter(|i| i.warehouse_id == id)
            .map(|i| i.id)
            .collect();
        tables.items.retain(|_, i| i.warehouse_id != id);
        tables
            .movements
            .retain(|m| !removed.contains(&m.inventory_item_id));
        tables.warehouses.remove(&id);
        Ok(())
    }

    // -- inventory --------------------------------------------------------

    async fn upsert_item(&self, input: UpsertItem) -> DomainResult<ItemView> {
        input.validate()?;
        let mut tables = self.write()?;
        if !tables.products.contains_key(&input.product_id) {
            return Err(DomainError::not_found(format!(
                "product {}",
                input.product_id
            )));
        }
        if !tables.warehouses.contains_key(&input.warehouse_id) {
            return Err(DomainError::not_found(format!(
                "warehouse {}",
                input.warehouse_id
            )));
        }
        let now = Utc::now();
        let existing = tables
            .items
            .values()
            .find(|i| i.product_id == input.product_id && i.warehouse_id == input.warehouse_id)
            .map(|i| i.id);
        let item = match existing {
            Some(item_id) => {
                let mut item = tables
                    .items
                    .get(&item_id)
                    .cloned()
                    .ok_or_else(|| DomainError::storage("stock row vanished during upsert"))?;
                item.quantity = input.quantity;
                item.reserved = input.reserved;
                item.last_updated = now;
                tables.items.insert(item_id, item.clone());
                item
            }
            None => {
                let item = InventoryItem::new(
                    input.product_id,
                    input.warehouse_id,
                    input.quantity,
                    input.reserved,
                    now,
                )?;
                tables.items.insert(item.id, item.clone());
                item
            }
        };
        tables.item_view(&item)
    }

    async fn item(&self, id: InventoryItemId) -> DomainResult<ItemView> {
        let tables = self.read()?;
        let item = tables
            .items
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("inventory item {id}")))?;
        tables.item_view(item)
    }

    async fn list_items(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<ItemView>> {
        let tables = self.read()?;
        let needle = search.map(str::to_lowercase);
        let mut all = Vec::new();
        for item in tables.items.values() {
            let view = tables.item_view(item)?;
            let keep = match &needle {
                Some(n) => {
                    view.product_sku.to_lowercase().contains(n)
                        || view.product_name.to_lowercase().contains(n)
                        || view.warehouse_name.to_lowercase().contains(n)
                }
                None => true,
            };
            if keep {
                all.push(view);
            }
        }
        all.sort_by(|a, b| {
            b.last_updated
                .cmp(&a.last_updated)
                .then_with(|| a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(Page::slice(all, &query))
    }

    async fn items_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<ItemView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for item in tables.items.values().filter(|i| i.warehouse_id == warehouse_id) {
            views.push(tables.item_view(item)?);
        }
        views.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(views)
    }

    async fn items_by_product(&self, product_id: ProductId) -> DomainResult<Vec<ItemView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for item in tables.items.values().filter(|i| i.product_id == product_id) {
            views.push(tables.item_view(item)?);
        }
        views.sort_by(|a, b| a.warehouse_name.cmp(&b.warehouse_name));
        Ok(views)
    }

    async fn low_stock_items(&self) -> DomainResult<Vec<ItemView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for item in tables.items.values() {
            let product = tables.products.get(&item.product_id).ok_or_else(|| {
                DomainError::storage("stock row references a missing product")
            })?;
            if item.is_low_stock(product.safety_stock) {
                views.push(tables.item_view(item)?);
            }
        }
        views.sort_by(|a, b| {
            a.quantity
                .cmp(&b.quantity)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        Ok(views)
    }

    async fn out_of_stock_items(&self) -> DomainResult<Vec<ItemView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for item in tables.items.values() {
            if item.is_out_of_stock() {
                views.push(tables.item_view(item)?);
            }
        }
        views.sort_by(|a, b| {
            a.available
                .cmp(&b.available)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        Ok(views)
    }

    async fn adjust_item(
        &self,
        id: InventoryItemId,
        new_quantity: i32,
        reason: Option<String>,
        performed_by: Option<UserId>,
    ) -> DomainResult<ItemView> {
        let mut tables = self.write()?;
        let mut item = tables
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("inventory item {id}")))?;
        let change = plan_set_quantity(item.quantity, new_quantity)?;
        let now = Utc::now();
        item.quantity = change.quantity_after;
        item.last_updated = now;
        tables.movements.push(change.into_movement(
            id,
            reason,
            Some(reference::MANUAL_ADJUSTMENT.to_string()),
            None,
            performed_by,
            now,
        ));
        tables.items.insert(id, item.clone());
        tables.item_view(&item)
    }

    async fn delete_item(&self, id: InventoryItemId) -> DomainResult<()> {
        let mut tables = self.write()?;
        if tables.items.remove(&id).is_none() {
            return Err(DomainError::not_found(format!("inventory item {id}")));
        }
        tables.movements.retain(|m| m.inventory_item_id != id);
        Ok(())
    }

    // -- movements --------------------------------------------------------

    async fn record_movement(&self, input: RecordMovement) -> DomainResult<MovementView> {
        let mut tables = self.write()?;
        let mut item = tables
            .items
            .get(&input.inventory_item_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::not_found(format!("inventory item {}", input.inventory_item_id))
            })?;
        let change = plan_movement(item.quantity, input.movement_type, input.quantity)?;
        let now = Utc::now();
        item.quantity = change.quantity_after;
        item.last_updated = now;
        let movement = change.into_movement(
            item.id,
            input.reason,
            input.reference_type,
            input.reference_id,
            input.performed_by,
            now,
        );
        tables.items.insert(item.id, item);
        tables.movements.push(movement.clone());
        tables.movement_view(&movement)
    }

    async fn movement(&self, id: MovementId) -> DomainResult<MovementView> {
        let tables = self.read()?;
        let movement = tables
            .movements
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| DomainError::not_found(format!("inventory movement {id}")))?;
        tables.movement_view(movement)
    }

    async fn list_movements(&self, query: PageQuery) -> DomainResult<Page<MovementView>> {
        let tables = self.read()?;
        let mut all = Vec::with_capacity(tables.movements.len());
        for movement in tables.movements.iter().rev() {
            all.push(tables.movement_view(movement)?);
        }
        Ok(Page::slice(all, &query))
    }

    async fn movements_by_item(
        &self,
        item_id: InventoryItemId,
    ) -> DomainResult<Vec<MovementView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for movement in tables
            .movements
            .iter()
            .rev()
            .filter(|m| m.inventory_item_id == item_id)
        {
            views.push(tables.movement_view(movement)?);
        }
        Ok(views)
    }

    async fn movements_by_type(
        &self,
        movement_type: MovementType,
    ) -> DomainResult<Vec<MovementView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for movement in tables
            .movements
            .iter()
            .rev()
            .filter(|m| m.movement_type == movement_type)
        {
            views.push(tables.movement_view(movement)?);
        }
        Ok(views)
    }

    async fn movements_by_product(
        &self,
        product_id: ProductId,
    ) -> DomainResult<Vec<MovementView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for movement in tables.movements.iter().rev() {
            let item = tables.items.get(&movement.inventory_item_id);
            if item.is_some_and(|i| i.product_id == product_id) {
                views.push(tables.movement_view(movement)?);
            }
        }
        Ok(views)
    }

    async fn movements_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Vec<MovementView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for movement in tables.movements.iter().rev() {
            let item = tables.items.get(&movement.inventory_item_id);
            if item.is_some_and(|i| i.warehouse_id == warehouse_id) {
                views.push(tables.movement_view(movement)?);
            }
        }
        Ok(views)
    }

    async fn movements_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<MovementView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for movement in tables
            .movements
            .iter()
            .rev()
            .filter(|m| m.created_at >= from && m.created_at <= to)
        {
            views.push(tables.movement_view(movement)?);
        }
        Ok(views)
    }

    // -- purchase orders --------------------------------------------------

    async fn create_order(&self, draft: OrderDraft) -> DomainResult<OrderView> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&draft.supplier_id) {
            return Err(DomainError::not_found(format!(
                "supplier {}",
                draft.supplier_id
            )));
        }
        let items = tables.resolve_lines(&draft.items)?;
        let now = Utc::now();
        let number = tables.next_order_number(now);
        let order = PurchaseOrder::create(
            number,
            draft.supplier_id,
            draft.created_by,
            draft.status,
            draft.expected_date,
            items,
            now,
        )?;
        tables.orders.insert(order.id, order.clone());
        tables.order_view(&order)
    }

    async fn order(&self, id: PurchaseOrderId) -> DomainResult<OrderView> {
        let tables = self.read()?;
        let order = tables
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
        tables.order_view(order)
    }

    async fn list_orders(&self, query: PageQuery) -> DomainResult<Page<OrderView>> {
        let tables = self.read()?;
        let mut all = Vec::with_capacity(tables.orders.len());
        for order in tables.orders.values() {
            all.push(tables.order_view(order)?);
        }
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        Ok(Page::slice(all, &query))
    }

    async fn orders_by_status(&self, status: OrderStatus) -> DomainResult<Vec<OrderView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for order in tables.orders.values().filter(|o| o.status == status) {
            views.push(tables.order_view(order)?);
        }
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    async fn orders_by_supplier(&self, supplier_id: SupplierId) -> DomainResult<Vec<OrderView>> {
        let tables = self.read()?;
        let mut views = Vec::new();
        for order in tables.orders.values().filter(|o| o.supplier_id == supplier_id) {
            views.push(tables.order_view(order)?);
        }
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(views)
    }

    async fn update_order(
        &self,
        id: PurchaseOrderId,
        draft: OrderDraft,
    ) -> DomainResult<OrderView> {
        let mut tables = self.write()?;
        let mut order = tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
        if !tables.suppliers.contains_key(&draft.supplier_id) {
            return Err(DomainError::not_found(format!(
                "supplier {}",
                draft.supplier_id
            )));
        }
        let items = tables.resolve_lines(&draft.items)?;
        order.apply_edit(draft.supplier_id, draft.expected_date, items)?;
        tables.orders.insert(id, order.clone());
        tables.order_view(&order)
    }

    async fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> DomainResult<OrderView> {
        let mut tables = self.write()?;
        let mut order = tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
        order.transition_to(status)?;
        tables.orders.insert(id, order.clone());
        tables.order_view(&order)
    }

    async fn receive_order(
        &self,
        id: PurchaseOrderId,
        receipt: ReceiveOrder,
    ) -> DomainResult<OrderView> {
        let mut tables = self.write()?;
        let mut order = tables
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
        if !tables.warehouses.contains_key(&receipt.warehouse_id) {
            return Err(DomainError::not_found(format!(
                "warehouse {}",
                receipt.warehouse_id
            )));
        }
        let plan = plan_receipt(&order, &receipt.lines)?;
        let now = Utc::now();
        for line in &plan.lines {
            let existing = tables
                .items
                .values()
                .find(|i| {
                    i.product_id == line.product_id && i.warehouse_id == receipt.warehouse_id
                })
                .map(|i| i.id);
            let mut item = match existing {
                Some(item_id) => tables
                    .items
                    .get(&item_id)
                    .cloned()
                    .ok_or_else(|| DomainError::storage("stock row vanished during receipt"))?,
                None => InventoryItem::empty(line.product_id, receipt.warehouse_id, now),
            };
            let change = plan_movement(item.quantity, MovementType::In, line.quantity)?;
            item.quantity = change.quantity_after;
            item.last_updated = now;
            let movement = change.into_movement(
                item.id,
                Some(plan.reason.clone()),
                Some(reference::PURCHASE_ORDER.to_string()),
                Some(order.id.to_string()),
                receipt.performed_by,
                now,
            );
            tables.items.insert(item.id, item);
            tables.movements.push(movement);
        }
        order.apply_receipt(&plan);
        tables.orders.insert(id, order.clone());
        tables.order_view(&order)
    }

    async fn delete_order(&self, id: PurchaseOrderId) -> DomainResult<()> {
        let mut tables = self.write()?;
        let order = tables
            .orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
        order.ensure_deletable()?;
        tables.orders.remove(&id);
        Ok(())
    }

    // -- dashboard --------------------------------------------------------

    async fn dashboard_stats(&self) -> DomainResult<DashboardStats> {
        let tables = self.read()?;
        let mut stats = DashboardStats::empty();
        stats.total_suppliers = tables.suppliers.len() as u64;
        stats.total_products = tables.products.len() as u64;
        stats.total_warehouses = tables.warehouses.len() as u64;
        stats.total_purchase_orders = tables.orders.len() as u64;

        let mut per_supplier: HashMap<SupplierId, Decimal> = HashMap::new();
        for order in tables.orders.values() {
            *per_supplier
                .entry(order.supplier_id)
                .or_insert(Decimal::ZERO) += order.total_amount;
        }
        let mut supplier_totals: Vec<(String, Decimal)> = per_supplier
            .into_iter()
            .filter_map(|(id, total)| {
                tables.suppliers.get(&id).map(|s| (s.name.clone(), total))
            })
            .collect();
        supplier_totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some((name, total)) = supplier_totals.into_iter().next() {
            stats.best_supplier_name = name;
            stats.best_supplier_total_amount = total;
        }

        let mut per_product: HashMap<ProductId, i64> = HashMap::new();
        for item in tables.items.values() {
            *per_product.entry(item.product_id).or_insert(0) += i64::from(item.quantity);
        }
        let mut stocked: Vec<(String, i64)> = per_product
            .into_iter()
            .filter_map(|(id, quantity)| {
                tables.products.get(&id).map(|p| (p.name.clone(), quantity))
            })
            .collect();

        let mut ascending = stocked.clone();
        ascending.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        if let Some((name, quantity)) = ascending.first() {
            stats.least_stocked_product = name.clone();
            stats.least_stocked_quantity = *quantity;
        }
        stats.low_stock_products = ascending
            .iter()
            .take(5)
            .map(|(name, quantity)| format!("{name} ({quantity})"))
            .collect();

        stocked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some((name, quantity)) = stocked.first() {
            stats.most_stocked_product = name.clone();
            stats.most_stocked_quantity = *quantity;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use supplyline_auth::NewUser;
    use supplyline_catalog::{NewProduct, NewSupplier, NewWarehouse};
    use supplyline_purchasing::ReceiptLine;

    async fn insert_product(
        store: &MemoryStore,
        sku: &str,
        name: &str,
        price: Decimal,
        safety_stock: i32,
    ) -> Product {
        store
            .insert_product(
                Product::create(
                    NewProduct {
                        sku: sku.to_string(),
                        name: name.to_string(),
                        category: None,
                        price,
                        safety_stock,
                    },
                    Utc::now(),
                )
                .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn insert_warehouse(store: &MemoryStore, name: &str) -> Warehouse {
        store
            .insert_warehouse(
                Warehouse::create(NewWarehouse {
                    name: name.to_string(),
                    location: None,
                    kind: None,
                    capacity: None,
                })
                .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn insert_supplier(store: &MemoryStore, name: &str) -> Supplier {
        store
            .insert_supplier(
                Supplier::create(
                    NewSupplier {
                        name: name.to_string(),
                        email: None,
                        phone: None,
                        address: None,
                        contact_person: None,
                    },
                    Utc::now(),
                )
                .unwrap(),
            )
            .await
            .unwrap()
    }

    fn upsert(product: &Product, warehouse: &Warehouse, quantity: i32, reserved: i32) -> UpsertItem {
        UpsertItem {
            product_id: product.id,
            warehouse_id: warehouse.id,
            quantity,
            reserved,
        }
    }

    /// Order with two lines: 10 bolts at 5.00 and 4 washers at 2.50.
    async fn sent_order(
        store: &MemoryStore,
        bolt: &Product,
        washer: &Product,
    ) -> OrderView {
        let vendor = insert_supplier(store, "Acme Metals").await;
        let order = store
            .create_order(OrderDraft {
                supplier_id: vendor.id,
                expected_date: None,
                status: None,
                items: vec![
                    OrderItemRequest {
                        product_id: bolt.id,
                        quantity: Some(10),
                        unit_price: Some(dec!(5.00)),
                    },
                    OrderItemRequest {
                        product_id: washer.id,
                        quantity: Some(4),
                        unit_price: None,
                    },
                ],
                created_by: None,
            })
            .await
            .unwrap();
        store
            .set_order_status(order.id, OrderStatus::Sent)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let store = MemoryStore::new();
        let product = insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 25).await;
        let warehouse = insert_warehouse(&store, "Central").await;

        let first = store
            .upsert_item(upsert(&product, &warehouse, 10, 2))
            .await
            .unwrap();
        assert_eq!(first.quantity, 10);
        assert_eq!(first.available, 8);
        assert_eq!(first.product_sku, "SKU-100");

        let second = store
            .upsert_item(upsert(&product, &warehouse, 25, 0))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.quantity, 25);

        // Direct writes leave no ledger entries.
        let ledger = store.list_movements(PageQuery::default()).await.unwrap();
        assert_eq!(ledger.total, 0);
    }

    #[tokio::test]
    async fn adjust_records_the_delta() {
        let store = MemoryStore::new();
        let product = insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 25).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let item = store
            .upsert_item(upsert(&product, &warehouse, 10, 0))
            .await
            .unwrap();

        let adjusted = store
            .adjust_item(item.id, 4, Some("cycle count".to_string()), None)
            .await
            .unwrap();
        assert_eq!(adjusted.quantity, 4);

        let movements = store.movements_by_item(item.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        let movement = &movements[0];
        assert_eq!(movement.movement_type, MovementType::Out);
        assert_eq!(movement.quantity, 6);
        assert_eq!(movement.quantity_before, 10);
        assert_eq!(movement.quantity_after, 4);
        assert_eq!(
            movement.reference_type.as_deref(),
            Some(reference::MANUAL_ADJUSTMENT)
        );
        assert_eq!(movement.reason.as_deref(), Some("cycle count"));
    }

    #[tokio::test]
    async fn overdrawing_stock_is_a_conflict_and_leaves_no_trace() {
        let store = MemoryStore::new();
        let product = insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let item = store
            .upsert_item(upsert(&product, &warehouse, 5, 0))
            .await
            .unwrap();

        let err = store
            .record_movement(RecordMovement {
                inventory_item_id: item.id,
                movement_type: MovementType::Out,
                quantity: 9,
                reason: None,
                reference_type: None,
                reference_id: None,
                performed_by: None,
            })
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("insufficient stock")),
            other => panic!("expected Conflict, got {other:?}"),
        }

        assert_eq!(store.item(item.id).await.unwrap().quantity, 5);
        assert!(store.movements_by_item(item.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn receiving_in_two_batches_completes_the_order() {
        let store = MemoryStore::new();
        let bolt = insert_product(&store, "SKU-100", "Steel Bolt M8", dec!(5.00), 0).await;
        let washer = insert_product(&store, "SKU-200", "Washer M10", dec!(2.50), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let order = sent_order(&store, &bolt, &washer).await;
        assert_eq!(order.total_amount, dec!(60.00));

        let bolt_line = order.items.iter().find(|i| i.product_id == bolt.id).unwrap().id;
        let washer_line = order.items.iter().find(|i| i.product_id == washer.id).unwrap().id;

        let partial = store
            .receive_order(
                order.id,
                ReceiveOrder {
                    warehouse_id: warehouse.id,
                    lines: vec![ReceiptLine {
                        purchase_order_item_id: bolt_line,
                        quantity_received: 6,
                    }],
                    performed_by: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(partial.status, OrderStatus::Sent);
        assert_eq!(
            partial
                .items
                .iter()
                .find(|i| i.id == bolt_line)
                .unwrap()
                .quantity_received,
            6
        );

        let stocked = store.items_by_product(bolt.id).await.unwrap();
        assert_eq!(stocked.len(), 1);
        assert_eq!(stocked[0].quantity, 6);

        let movements = store.movements_by_warehouse(warehouse.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::In);
        let expected_reason = format!("Received from PO: {}", order.order_number);
        assert_eq!(movements[0].reason.as_deref(), Some(expected_reason.as_str()));
        assert_eq!(
            movements[0].reference_type.as_deref(),
            Some(reference::PURCHASE_ORDER)
        );

        let done = store
            .receive_order(
                order.id,
                ReceiveOrder {
                    warehouse_id: warehouse.id,
                    lines: vec![
                        ReceiptLine {
                            purchase_order_item_id: bolt_line,
                            quantity_received: 4,
                        },
                        ReceiptLine {
                            purchase_order_item_id: washer_line,
                            quantity_received: 4,
                        },
                    ],
                    performed_by: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(done.status, OrderStatus::Received);
        assert_eq!(store.items_by_product(bolt.id).await.unwrap()[0].quantity, 10);
        assert_eq!(store.items_by_product(washer.id).await.unwrap()[0].quantity, 4);
    }

    #[tokio::test]
    async fn receiving_a_draft_order_is_invalid_state() {
        let store = MemoryStore::new();
        let bolt = insert_product(&store, "SKU-100", "Steel Bolt M8", dec!(5.00), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let vendor = insert_supplier(&store, "Acme Metals").await;
        let order = store
            .create_order(OrderDraft {
                supplier_id: vendor.id,
                expected_date: None,
                status: None,
                items: vec![OrderItemRequest {
                    product_id: bolt.id,
                    quantity: Some(3),
                    unit_price: None,
                }],
                created_by: None,
            })
            .await
            .unwrap();

        let line = order.items[0].id;
        let err = store
            .receive_order(
                order.id,
                ReceiveOrder {
                    warehouse_id: warehouse.id,
                    lines: vec![ReceiptLine {
                        purchase_order_item_id: line,
                        quantity_received: 1,
                    }],
                    performed_by: None,
                },
            )
            .await
            .unwrap_err();
        match err {
            DomainError::InvalidState(msg) => assert!(msg.contains("SENT")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_receipt_batch_changes_nothing() {
        let store = MemoryStore::new();
        let bolt = insert_product(&store, "SKU-100", "Steel Bolt M8", dec!(5.00), 0).await;
        let washer = insert_product(&store, "SKU-200", "Washer M10", dec!(2.50), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let order = sent_order(&store, &bolt, &washer).await;

        let bolt_line = order.items.iter().find(|i| i.product_id == bolt.id).unwrap().id;
        let washer_line = order.items.iter().find(|i| i.product_id == washer.id).unwrap().id;

        // The washer line overshoots, so the whole batch must be refused.
        let err = store
            .receive_order(
                order.id,
                ReceiveOrder {
                    warehouse_id: warehouse.id,
                    lines: vec![
                        ReceiptLine {
                            purchase_order_item_id: bolt_line,
                            quantity_received: 6,
                        },
                        ReceiptLine {
                            purchase_order_item_id: washer_line,
                            quantity_received: 99,
                        },
                    ],
                    performed_by: None,
                },
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("remaining")),
            other => panic!("expected Validation, got {other:?}"),
        }

        let after = store.order(order.id).await.unwrap();
        assert_eq!(after.status, OrderStatus::Sent);
        assert!(after.items.iter().all(|i| i.quantity_received == 0));
        assert!(store.items_by_product(bolt.id).await.unwrap().is_empty());
        assert_eq!(store.list_movements(PageQuery::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn duplicate_sku_is_a_conflict() {
        let store = MemoryStore::new();
        insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 0).await;
        let err = store
            .insert_product(
                Product::create(
                    NewProduct {
                        sku: "SKU-100".to_string(),
                        name: "Another Nut".to_string(),
                        category: None,
                        price: dec!(0.40),
                        safety_stock: 0,
                    },
                    Utc::now(),
                )
                .unwrap(),
            )
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("SKU-100")),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let register = |email: &str| {
            User::register(
                NewUser {
                    email: email.to_string(),
                    password: "hunter22".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    role: None,
                },
                Utc::now(),
            )
            .unwrap()
        };
        store.insert_user(register("ada@example.com")).await.unwrap();
        let err = store
            .insert_user(register("ada@example.com"))
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleting_a_product_with_stock_is_a_conflict() {
        let store = MemoryStore::new();
        let product = insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        store
            .upsert_item(upsert(&product, &warehouse, 1, 0))
            .await
            .unwrap();

        let err = store.delete_product(product.id).await.unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert!(store.product(product.id).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_a_warehouse_cascades_stock_and_ledger() {
        let store = MemoryStore::new();
        let product = insert_product(&store, "SKU-100", "Hex Nut M10", dec!(0.35), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        let item = store
            .upsert_item(upsert(&product, &warehouse, 10, 0))
            .await
            .unwrap();
        store
            .adjust_item(item.id, 7, None, None)
            .await
            .unwrap();

        store.delete_warehouse(warehouse.id).await.unwrap();

        assert!(store.items_by_product(product.id).await.unwrap().is_empty());
        assert_eq!(store.list_movements(PageQuery::default()).await.unwrap().total, 0);
        assert!(matches!(
            store.item(item.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn only_draft_orders_can_be_deleted() {
        let store = MemoryStore::new();
        let bolt = insert_product(&store, "SKU-100", "Steel Bolt M8", dec!(5.00), 0).await;
        let vendor = insert_supplier(&store, "Acme Metals").await;
        let draft = OrderDraft {
            supplier_id: vendor.id,
            expected_date: None,
            status: None,
            items: vec![OrderItemRequest {
                product_id: bolt.id,
                quantity: Some(1),
                unit_price: None,
            }],
            created_by: None,
        };

        let sent = store.create_order(draft.clone()).await.unwrap();
        store
            .set_order_status(sent.id, OrderStatus::Sent)
            .await
            .unwrap();
        assert!(matches!(
            store.delete_order(sent.id).await.unwrap_err(),
            DomainError::InvalidState(_)
        ));

        let open = store.create_order(draft).await.unwrap();
        store.delete_order(open.id).await.unwrap();
        assert!(matches!(
            store.order(open.id).await.unwrap_err(),
            DomainError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn order_numbers_are_sequential() {
        let store = MemoryStore::new();
        let bolt = insert_product(&store, "SKU-100", "Steel Bolt M8", dec!(5.00), 0).await;
        let vendor = insert_supplier(&store, "Acme Metals").await;
        let draft = OrderDraft {
            supplier_id: vendor.id,
            expected_date: None,
            status: None,
            items: vec![OrderItemRequest {
                product_id: bolt.id,
                quantity: Some(1),
                unit_price: None,
            }],
            created_by: None,
        };

        let first = store.create_order(draft.clone()).await.unwrap();
        let second = store.create_order(draft).await.unwrap();
        assert!(first.order_number.ends_with("-001"), "{}", first.order_number);
        assert!(second.order_number.ends_with("-002"), "{}", second.order_number);
    }

    #[tokio::test]
    async fn dashboard_defaults_to_dashes_when_empty() {
        let store = MemoryStore::new();
        let stats = store.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.best_supplier_name, "-");
        assert_eq!(stats.most_stocked_product, "-");
        assert!(stats.low_stock_products.is_empty());
    }

    #[tokio::test]
    async fn dashboard_aggregates_orders_and_stock() {
        let store = MemoryStore::new();
        let scarce = insert_product(&store, "SKU-100", "Copper Wire", dec!(1.00), 0).await;
        let plenty = insert_product(&store, "SKU-200", "PVC Pipe", dec!(2.00), 0).await;
        let warehouse = insert_warehouse(&store, "Central").await;
        store
            .upsert_item(upsert(&scarce, &warehouse, 3, 0))
            .await
            .unwrap();
        store
            .upsert_item(upsert(&plenty, &warehouse, 30, 0))
            .await
            .unwrap();

        let small = insert_supplier(&store, "Smallco").await;
        let big = insert_supplier(&store, "Bigco").await;
        for (vendor, quantity) in [(small.id, 1), (big.id, 50)] {
            store
                .create_order(OrderDraft {
                    supplier_id: vendor,
                    expected_date: None,
                    status: None,
                    items: vec![OrderItemRequest {
                        product_id: scarce.id,
                        quantity: Some(quantity),
                        unit_price: Some(dec!(1.00)),
                    }],
                    created_by: None,
                })
                .await
                .unwrap();
        }

        let stats = store.dashboard_stats().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_suppliers, 2);
        assert_eq!(stats.total_purchase_orders, 2);
        assert_eq!(stats.best_supplier_name, "Bigco");
        assert_eq!(stats.best_supplier_total_amount, dec!(50.00));
        assert_eq!(stats.most_stocked_product, "PVC Pipe");
        assert_eq!(stats.most_stocked_quantity, 30);
        assert_eq!(stats.least_stocked_product, "Copper Wire");
        assert_eq!(stats.least_stocked_quantity, 3);
        assert_eq!(
            stats.low_stock_products,
            vec!["Copper Wire (3)".to_string(), "PVC Pipe (30)".to_string()]
        );
    }

    #[tokio::test]
    async fn product_listing_pages_and_filters() {
        let store = MemoryStore::new();
        insert_product(&store, "SKU-100", "Alpha", dec!(1.00), 0).await;
        insert_product(&store, "SKU-200", "Beta", dec!(1.00), 0).await;
        insert_product(&store, "SKU-300", "Gamma", dec!(1.00), 0).await;

        let found = store
            .list_products(PageQuery::default(), Some("bet"))
            .await
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].name, "Beta");

        let windowed = store
            .list_products(PageQuery::new(0, 2), None)
            .await
            .unwrap();
        assert_eq!(windowed.total, 3);
        assert_eq!(windowed.items.len(), 2);
    }
}
