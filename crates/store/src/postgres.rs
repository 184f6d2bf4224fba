//! Postgres backend.
//!
//! Every mutating operation runs in one transaction; rows that feed a
//! planner are read with `FOR UPDATE` so concurrent receipts and
//! adjustments against the same stock serialize instead of double
//! counting. The schema is bootstrapped lazily on connect.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use supplyline_auth::User;
use supplyline_catalog::{
    Product, ProductUpdate, Supplier, SupplierUpdate, Warehouse, WarehouseUpdate,
};
use supplyline_core::{
    DomainError, DomainResult, InventoryItemId, MovementId, OrderItemId, Page, PageQuery,
    ProductId, PurchaseOrderId, SupplierId, UserId, WarehouseId,
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

/// Applied statement by statement on connect; every statement is
/// idempotent so restarts are cheap.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        role          TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id           UUID PRIMARY KEY,
        sku          TEXT NOT NULL UNIQUE,
        name         TEXT NOT NULL,
        category     TEXT,
        price        NUMERIC NOT NULL,
        safety_stock INTEGER NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL,
        updated_at   TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS suppliers (
        id             UUID PRIMARY KEY,
        name           TEXT NOT NULL,
        email          TEXT UNIQUE,
        phone          TEXT,
        address        TEXT,
        contact_person TEXT,
        created_at     TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS warehouses (
        id       UUID PRIMARY KEY,
        name     TEXT NOT NULL UNIQUE,
        location TEXT,
        kind     TEXT NOT NULL,
        capacity INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        id           UUID PRIMARY KEY,
        product_id   UUID NOT NULL REFERENCES products (id),
        warehouse_id UUID NOT NULL REFERENCES warehouses (id) ON DELETE CASCADE,
        quantity     INTEGER NOT NULL,
        reserved     INTEGER NOT NULL,
        last_updated TIMESTAMPTZ NOT NULL,
        UNIQUE (product_id, warehouse_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_movements (
        id                UUID PRIMARY KEY,
        inventory_item_id UUID NOT NULL REFERENCES inventory_items (id) ON DELETE CASCADE,
        movement_type     TEXT NOT NULL,
        quantity          INTEGER NOT NULL,
        quantity_before   INTEGER NOT NULL,
        quantity_after    INTEGER NOT NULL,
        reason            TEXT,
        reference_type    TEXT,
        reference_id      TEXT,
        performed_by      UUID REFERENCES users (id),
        created_at        TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchase_orders (
        id            UUID PRIMARY KEY,
        order_number  TEXT NOT NULL UNIQUE,
        supplier_id   UUID NOT NULL REFERENCES suppliers (id),
        created_by    UUID REFERENCES users (id),
        status        TEXT NOT NULL,
        total_amount  NUMERIC NOT NULL,
        expected_date DATE,
        created_at    TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchase_order_items (
        id                UUID PRIMARY KEY,
        purchase_order_id UUID NOT NULL REFERENCES purchase_orders (id) ON DELETE CASCADE,
        product_id        UUID NOT NULL REFERENCES products (id),
        quantity_ordered  INTEGER NOT NULL,
        quantity_received INTEGER NOT NULL,
        unit_price        NUMERIC NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_movements_item ON inventory_movements (inventory_item_id)",
    "CREATE INDEX IF NOT EXISTS idx_movements_created_at ON inventory_movements (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_items_product ON inventory_items (product_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_supplier ON purchase_orders (supplier_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON purchase_order_items (purchase_order_id)",
];

const ITEM_VIEW_SELECT: &str = r#"
    SELECT i.id, i.product_id, p.sku AS product_sku, p.name AS product_name,
           i.warehouse_id, w.name AS warehouse_name,
           i.quantity, i.reserved, i.last_updated
    FROM inventory_items i
    JOIN products p ON p.id = i.product_id
    JOIN warehouses w ON w.id = i.warehouse_id
"#;

const MOVEMENT_VIEW_SELECT: &str = r#"
    SELECT m.id, m.inventory_item_id, p.sku AS product_sku, p.name AS product_name,
           w.name AS warehouse_name, m.movement_type, m.quantity,
           m.quantity_before, m.quantity_after, m.reason, m.reference_type,
           m.reference_id, u.first_name AS performed_by_first,
           u.last_name AS performed_by_last, m.created_at
    FROM inventory_movements m
    JOIN inventory_items i ON i.id = m.inventory_item_id
    JOIN products p ON p.id = i.product_id
    JOIN warehouses w ON w.id = i.warehouse_id
    LEFT JOIN users u ON u.id = m.performed_by
"#;

const ORDER_VIEW_SELECT: &str = r#"
    SELECT o.id, o.order_number, o.supplier_id, s.name AS supplier_name,
           o.created_by, u.first_name AS created_by_first,
           u.last_name AS created_by_last, o.status, o.total_amount,
           o.expected_date, o.created_at
    FROM purchase_orders o
    JOIN suppliers s ON s.id = o.supplier_id
    LEFT JOIN users u ON u.id = o.created_by
"#;

const ORDER_ITEM_VIEW_SELECT: &str = r#"
    SELECT oi.id, oi.purchase_order_id, oi.product_id, p.sku AS product_sku,
           p.name AS product_name, oi.quantity_ordered, oi.quantity_received,
           oi.unit_price
    FROM purchase_order_items oi
    JOIN products p ON p.id = oi.product_id
"#;

fn db_err(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database error");
    DomainError::storage(err.to_string())
}

fn joined_name(first: Option<String>, last: Option<String>) -> Option<String> {
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        _ => None,
    }
}

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    let role: String = row.try_get("role").map_err(db_err)?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(db_err)?),
        email: row.try_get("email").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        first_name: row.try_get("first_name").map_err(db_err)?,
        last_name: row.try_get("last_name").map_err(db_err)?,
        role: role.parse()?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn product_from_row(row: &PgRow) -> DomainResult<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id").map_err(db_err)?),
        sku: row.try_get("sku").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        category: row.try_get("category").map_err(db_err)?,
        price: row.try_get("price").map_err(db_err)?,
        safety_stock: row.try_get("safety_stock").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn supplier_from_row(row: &PgRow) -> DomainResult<Supplier> {
    Ok(Supplier {
        id: SupplierId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        phone: row.try_get("phone").map_err(db_err)?,
        address: row.try_get("address").map_err(db_err)?,
        contact_person: row.try_get("contact_person").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn warehouse_from_row(row: &PgRow) -> DomainResult<Warehouse> {
    let kind: String = row.try_get("kind").map_err(db_err)?;
    Ok(Warehouse {
        id: WarehouseId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        location: row.try_get("location").map_err(db_err)?,
        kind: kind.parse()?,
        capacity: row.try_get("capacity").map_err(db_err)?,
    })
}

fn item_view_from_row(row: &PgRow) -> DomainResult<ItemView> {
    let quantity: i32 = row.try_get("quantity").map_err(db_err)?;
    let reserved: i32 = row.try_get("reserved").map_err(db_err)?;
    Ok(ItemView {
        id: InventoryItemId::from_uuid(row.try_get("id").map_err(db_err)?),
        product_id: ProductId::from_uuid(row.try_get("product_id").map_err(db_err)?),
        product_sku: row.try_get("product_sku").map_err(db_err)?,
        product_name: row.try_get("product_name").map_err(db_err)?,
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id").map_err(db_err)?),
        warehouse_name: row.try_get("warehouse_name").map_err(db_err)?,
        quantity,
        reserved,
        available: quantity - reserved,
        last_updated: row.try_get("last_updated").map_err(db_err)?,
    })
}

fn movement_view_from_row(row: &PgRow) -> DomainResult<MovementView> {
    let movement_type: String = row.try_get("movement_type").map_err(db_err)?;
    Ok(MovementView {
        id: MovementId::from_uuid(row.try_get("id").map_err(db_err)?),
        inventory_item_id: InventoryItemId::from_uuid(
            row.try_get("inventory_item_id").map_err(db_err)?,
        ),
        product_sku: row.try_get("product_sku").map_err(db_err)?,
        product_name: row.try_get("product_name").map_err(db_err)?,
        warehouse_name: row.try_get("warehouse_name").map_err(db_err)?,
        movement_type: movement_type.parse()?,
        quantity: row.try_get("quantity").map_err(db_err)?,
        quantity_before: row.try_get("quantity_before").map_err(db_err)?,
        quantity_after: row.try_get("quantity_after").map_err(db_err)?,
        reason: row.try_get("reason").map_err(db_err)?,
        reference_type: row.try_get("reference_type").map_err(db_err)?,
        reference_id: row.try_get("reference_id").map_err(db_err)?,
        performed_by_name: joined_name(
            row.try_get("performed_by_first").map_err(db_err)?,
            row.try_get("performed_by_last").map_err(db_err)?,
        ),
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

/// Header only; `items` is filled in by the caller.
fn order_view_from_row(row: &PgRow) -> DomainResult<OrderView> {
    let status: String = row.try_get("status").map_err(db_err)?;
    let created_by: Option<Uuid> = row.try_get("created_by").map_err(db_err)?;
    Ok(OrderView {
        id: PurchaseOrderId::from_uuid(row.try_get("id").map_err(db_err)?),
        order_number: row.try_get("order_number").map_err(db_err)?,
        supplier_id: SupplierId::from_uuid(row.try_get("supplier_id").map_err(db_err)?),
        supplier_name: row.try_get("supplier_name").map_err(db_err)?,
        created_by_id: created_by.map(UserId::from_uuid),
        created_by_name: joined_name(
            row.try_get("created_by_first").map_err(db_err)?,
            row.try_get("created_by_last").map_err(db_err)?,
        ),
        status: status.parse()?,
        total_amount: row.try_get("total_amount").map_err(db_err)?,
        expected_date: row.try_get("expected_date").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        items: Vec::new(),
    })
}

fn order_item_view_from_row(row: &PgRow) -> DomainResult<(PurchaseOrderId, OrderItemView)> {
    let order_id =
        PurchaseOrderId::from_uuid(row.try_get("purchase_order_id").map_err(db_err)?);
    let quantity_ordered: i32 = row.try_get("quantity_ordered").map_err(db_err)?;
    let unit_price: Decimal = row.try_get("unit_price").map_err(db_err)?;
    Ok((
        order_id,
        OrderItemView {
            id: OrderItemId::from_uuid(row.try_get("id").map_err(db_err)?),
            product_id: ProductId::from_uuid(row.try_get("product_id").map_err(db_err)?),
            product_sku: row.try_get("product_sku").map_err(db_err)?,
            product_name: row.try_get("product_name").map_err(db_err)?,
            quantity_ordered,
            quantity_received: row.try_get("quantity_received").map_err(db_err)?,
            unit_price,
            line_total: unit_price * Decimal::from(quantity_ordered),
        },
    ))
}

/// Rehydrate a domain order so the pure planners can run against it.
async fn load_order(
    conn: &mut PgConnection,
    id: PurchaseOrderId,
    lock: bool,
) -> DomainResult<PurchaseOrder> {
    let header_sql = if lock {
        "SELECT id, order_number, supplier_id, created_by, status, total_amount, expected_date, created_at FROM purchase_orders WHERE id = $1 FOR UPDATE"
    } else {
        "SELECT id, order_number, supplier_id, created_by, status, total_amount, expected_date, created_at FROM purchase_orders WHERE id = $1"
    };
    let header = sqlx::query(header_sql)
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;

    let items_sql = if lock {
        "SELECT id, product_id, quantity_ordered, quantity_received, unit_price FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY id FOR UPDATE"
    } else {
        "SELECT id, product_id, quantity_ordered, quantity_received, unit_price FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY id"
    };
    let item_rows = sqlx::query(items_sql)
        .bind(*id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

    let mut items = Vec::with_capacity(item_rows.len());
    for row in &item_rows {
        items.push(PurchaseOrderItem {
            id: OrderItemId::from_uuid(row.try_get("id").map_err(db_err)?),
            product_id: ProductId::from_uuid(row.try_get("product_id").map_err(db_err)?),
            quantity_ordered: row.try_get("quantity_ordered").map_err(db_err)?,
            quantity_received: row.try_get("quantity_received").map_err(db_err)?,
            unit_price: row.try_get("unit_price").map_err(db_err)?,
        });
    }

    let status: String = header.try_get("status").map_err(db_err)?;
    let created_by: Option<Uuid> = header.try_get("created_by").map_err(db_err)?;
    Ok(PurchaseOrder {
        id,
        order_number: header.try_get("order_number").map_err(db_err)?,
        supplier_id: SupplierId::from_uuid(header.try_get("supplier_id").map_err(db_err)?),
        created_by: created_by.map(UserId::from_uuid),
        status: status.parse()?,
        total_amount: header.try_get("total_amount").map_err(db_err)?,
        expected_date: header.try_get("expected_date").map_err(db_err)?,
        created_at: header.try_get("created_at").map_err(db_err)?,
        items,
    })
}

/// Joined view of one order, as seen by the current connection (so inside
/// a transaction it reflects uncommitted writes).
async fn order_view(conn: &mut PgConnection, id: PurchaseOrderId) -> DomainResult<OrderView> {
    let header_sql = format!("{ORDER_VIEW_SELECT} WHERE o.id = $1");
    let header = sqlx::query(&header_sql)
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found(format!("purchase order {id}")))?;
    let mut view = order_view_from_row(&header)?;

    let items_sql = format!("{ORDER_ITEM_VIEW_SELECT} WHERE oi.purchase_order_id = $1 ORDER BY oi.id");
    let item_rows = sqlx::query(&items_sql)
        .bind(*id.as_uuid())
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
    for row in &item_rows {
        let (_, item) = order_item_view_from_row(row)?;
        view.items.push(item);
    }
    Ok(view)
}

/// Fetch the line items for a batch of order headers in one round trip.
async fn attach_order_items(
    conn: &mut PgConnection,
    views: &mut [OrderView],
) -> DomainResult<()> {
    if views.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = views.iter().map(|v| *v.id.as_uuid()).collect();
    let sql = format!("{ORDER_ITEM_VIEW_SELECT} WHERE oi.purchase_order_id = ANY($1) ORDER BY oi.id");
    let rows = sqlx::query(&sql)
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
    for row in &rows {
        let (order_id, item) = order_item_view_from_row(row)?;
        if let Some(view) = views.iter_mut().find(|v| v.id == order_id) {
            view.items.push(item);
        }
    }
    Ok(())
}

async fn product_for_line(
    conn: &mut PgConnection,
    request: &OrderItemRequest,
) -> DomainResult<Product> {
    let row = sqlx::query("SELECT id, sku, name, category, price, safety_stock, created_at, updated_at FROM products WHERE id = $1")
        .bind(*request.product_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found(format!("product {}", request.product_id)))?;
    product_from_row(&row)
}

async fn insert_order_rows(
    conn: &mut PgConnection,
    order: &PurchaseOrder,
) -> DomainResult<()> {
    sqlx::query(
        "INSERT INTO purchase_orders (id, order_number, supplier_id, created_by, status, total_amount, expected_date, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(*order.id.as_uuid())
    .bind(&order.order_number)
    .bind(*order.supplier_id.as_uuid())
    .bind(order.created_by.map(|u| *u.as_uuid()))
    .bind(order.status.as_str())
    .bind(order.total_amount)
    .bind(order.expected_date)
    .bind(order.created_at)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    insert_order_items(conn, order).await
}

async fn insert_order_items(
    conn: &mut PgConnection,
    order: &PurchaseOrder,
) -> DomainResult<()> {
    for item in &order.items {
        sqlx::query(
            "INSERT INTO purchase_order_items (id, purchase_order_id, product_id, quantity_ordered, quantity_received, unit_price) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*item.id.as_uuid())
        .bind(*order.id.as_uuid())
        .bind(*item.product_id.as_uuid())
        .bind(item.quantity_ordered)
        .bind(item.quantity_received)
        .bind(item.unit_price)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

async fn insert_movement(
    conn: &mut PgConnection,
    movement: &InventoryMovement,
) -> DomainResult<()> {
    sqlx::query(
        "INSERT INTO inventory_movements (id, inventory_item_id, movement_type, quantity, quantity_before, quantity_after, reason, reference_type, reference_id, performed_by, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(*movement.id.as_uuid())
    .bind(*movement.inventory_item_id.as_uuid())
    .bind(movement.movement_type.as_str())
    .bind(movement.quantity)
    .bind(movement.quantity_before)
    .bind(movement.quantity_after)
    .bind(movement.reason.as_deref())
    .bind(movement.reference_type.as_deref())
    .bind(movement.reference_id.as_deref())
    .bind(movement.performed_by.map(|u| *u.as_uuid()))
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn exists(conn: &mut PgConnection, sql: &str, id: Uuid) -> DomainResult<bool> {
    let row = sqlx::query(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    Ok(row.is_some())
}

/// [`Store`] backed by a Postgres pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and bootstrap the schema.
    pub async fn connect(database_url: &str) -> DomainResult<Self> {
        let pool = PgPool::connect(database_url).await.map_err(db_err)?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> DomainResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    // -- users ------------------------------------------------------------

    async fn insert_user(&self, user: User) -> DomainResult<User> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let taken = sqlx::query("SELECT 1 AS one FROM users WHERE email = $1")
            .bind(&user.email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if taken.is_some() {
            return Err(DomainError::conflict(
                "an account with this email already exists",
            ));
        }
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user(&self, id: UserId) -> DomainResult<User> {
        let row = sqlx::query("SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
        user_from_row(&row)
    }

    // -- products ---------------------------------------------------------

    async fn insert_product(&self, product: Product) -> DomainResult<Product> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let taken = sqlx::query("SELECT 1 AS one FROM products WHERE sku = $1")
            .bind(&product.sku)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if taken.is_some() {
            return Err(DomainError::conflict(format!(
                "a product with SKU {} already exists",
                product.sku
            )));
        }
        sqlx::query(
            "INSERT INTO products (id, sku, name, category, price, safety_stock, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*product.id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.category.as_deref())
        .bind(product.price)
        .bind(product.safety_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> DomainResult<Product> {
        let row = sqlx::query("SELECT id, sku, name, category, price, safety_stock, created_at, updated_at FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        product_from_row(&row)
    }

    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<Product>> {
        let pattern = search.map(|s| format!("%{s}%"));
        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM products WHERE ($1::TEXT IS NULL OR sku ILIKE $1 OR name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .try_get("count")
        .map_err(db_err)?;

        let rows = sqlx::query(
            "SELECT id, sku, name, category, price, safety_stock, created_at, updated_at FROM products WHERE ($1::TEXT IS NULL OR sku ILIKE $1 OR name ILIKE $1) ORDER BY created_at, id LIMIT $2 OFFSET $3",
        )
        .bind(pattern.as_deref())
        .bind(i64::from(query.limit()))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        let items = rows
            .iter()
            .map(product_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, &query))
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> DomainResult<Product> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let row = sqlx::query("SELECT id, sku, name, category, price, safety_stock, created_at, updated_at FROM products WHERE id = $1 FOR UPDATE")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        let mut product = product_from_row(&row)?;

        if let Some(sku) = &update.sku {
            let sku = sku.trim();
            let taken = sqlx::query("SELECT 1 AS one FROM products WHERE sku = $1 AND id <> $2")
                .bind(sku)
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
            if taken.is_some() {
                return Err(DomainError::conflict(format!(
                    "a product with SKU {sku} already exists"
                )));
            }
        }

        product.apply_update(update, Utc::now())?;
        sqlx::query(
            "UPDATE products SET sku = $2, name = $3, category = $4, price = $5, safety_stock = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.category.as_deref())
        .bind(product.price)
        .bind(product.safety_stock)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !exists(&mut tx, "SELECT 1 AS one FROM products WHERE id = $1", *id.as_uuid()).await? {
            return Err(DomainError::not_found(format!("product {id}")));
        }
        if exists(
            &mut tx,
            "SELECT 1 AS one FROM inventory_items WHERE product_id = $1 LIMIT 1",
            *id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::conflict("product still has inventory records"));
        }
        if exists(
            &mut tx,
            "SELECT 1 AS one FROM purchase_order_items WHERE product_id = $1 LIMIT 1",
            *id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::conflict(
                "product is referenced by purchase orders",
            ));
        }
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // -- suppliers --------------------------------------------------------

    async fn insert_supplier(&self, supplier: Supplier) -> DomainResult<Supplier> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if let Some(email) = &supplier.email {
            let taken = sqlx::query("SELECT 1 AS one FROM suppliers WHERE email = $1")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
            if taken.is_some() {
                return Err(DomainError::conflict(format!(
                    "a supplier with email {email} already exists"
                )));
            }
        }
        sqlx::query(
            "INSERT INTO suppliers (id, name, email, phone, address, contact_person, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(*supplier.id.as_uuid())
        .bind(&supplier.name)
        .bind(supplier.email.as_deref())
        .bind(supplier.phone.as_deref())
        .bind(supplier.address.as_deref())
        .bind(supplier.contact_person.as_deref())
        .bind(supplier.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(supplier)
    }

    async fn supplier(&self, id: SupplierId) -> DomainResult<Supplier> {
        let row = sqlx::query("SELECT id, name, email, phone, address, contact_person, created_at FROM suppliers WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
        supplier_from_row(&row)
    }

    async fn list_suppliers(&self, search: Option<&str>) -> DomainResult<Vec<Supplier>> {
        let pattern = search.map(|s| format!("%{s}%"));
        let rows = sqlx::query(
            "SELECT id, name, email, phone, address, contact_person, created_at FROM suppliers WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1) ORDER BY created_at, id",
        )
        .bind(pattern.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(supplier_from_row).collect()
    }

    async fn update_supplier(
        &self,
        id: SupplierId,
        update: SupplierUpdate,
    ) -> DomainResult<Supplier> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let row = sqlx::query("SELECT id, name, email, phone, address, contact_person, created_at FROM suppliers WHERE id = $1 FOR UPDATE")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
        let mut supplier = supplier_from_row(&row)?;

        if let Some(email) = &update.email {
            let email = email.trim();
            if !email.is_empty() {
                let taken =
                    sqlx::query("SELECT 1 AS one FROM suppliers WHERE email = $1 AND id <> $2")
                        .bind(email)
                        .bind(*id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(db_err)?;
                if taken.is_some() {
                    return Err(DomainError::conflict(format!(
                        "a supplier with email {email} already exists"
                    )));
                }
            }
        }

        supplier.apply_update(update)?;
        sqlx::query(
            "UPDATE suppliers SET name = $2, email = $3, phone = $4, address = $5, contact_person = $6 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(&supplier.name)
        .bind(supplier.email.as_deref())
        .bind(supplier.phone.as_deref())
        .bind(supplier.address.as_deref())
        .bind(supplier.contact_person.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(supplier)
    }

    async fn delete_supplier(&self, id: SupplierId) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !exists(&mut tx, "SELECT 1 AS one FROM suppliers WHERE id = $1", *id.as_uuid()).await? {
            return Err(DomainError::not_found(format!("supplier {id}")));
        }
        if exists(
            &mut tx,
            "SELECT 1 AS one FROM purchase_orders WHERE supplier_id = $1 LIMIT 1",
            *id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::conflict(
                "supplier is referenced by purchase orders",
            ));
        }
        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // -- warehouses -------------------------------------------------------

    async fn insert_warehouse(&self, warehouse: Warehouse) -> DomainResult<Warehouse> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let taken = sqlx::query("SELECT 1 AS one FROM warehouses WHERE name = $1")
            .bind(&warehouse.name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if taken.is_some() {
            return Err(DomainError::conflict(format!(
                "a warehouse named {} already exists",
                warehouse.name
            )));
        }
        sqlx::query(
            "INSERT INTO warehouses (id, name, location, kind, capacity) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*warehouse.id.as_uuid())
        .bind(&warehouse.name)
        .bind(warehouse.location.as_deref())
        .bind(warehouse.kind.as_str())
        .bind(warehouse.capacity)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(warehouse)
    }

    async fn warehouse(&self, id: WarehouseId) -> DomainResult<Warehouse> {
        let row = sqlx::query("SELECT id, name, location, kind, capacity FROM warehouses WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))?;
        warehouse_from_row(&row)
    }

    async fn list_warehouses(&self, search: Option<&str>) -> DomainResult<Vec<Warehouse>> {
        let pattern = search.map(|s| format!("%{s}%"));
        let rows = sqlx::query(
            "SELECT id, name, location, kind, capacity FROM warehouses WHERE ($1::TEXT IS NULL OR name ILIKE $1 OR location ILIKE $1) ORDER BY name, id",
        )
        .bind(pattern.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(warehouse_from_row).collect()
    }

    async fn update_warehouse(
        &self,
        id: WarehouseId,
        update: WarehouseUpdate,
    ) -> DomainResult<Warehouse> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let row = sqlx::query("SELECT id, name, location, kind, capacity FROM warehouses WHERE id = $1 FOR UPDATE")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))?;
        let mut warehouse = warehouse_from_row(&row)?;

        if let Some(name) = &update.name {
            let name = name.trim();
            let taken = sqlx::query("SELECT 1 AS one FROM warehouses WHERE name = $1 AND id <> $2")
                .bind(name)
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
            if taken.is_some() {
                return Err(DomainError::conflict(format!(
                    "a warehouse named {name} already exists"
                )));
            }
        }

        warehouse.apply_update(update)?;
        sqlx::query(
            "UPDATE warehouses SET name = $2, location = $3, kind = $4, capacity = $5 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(&warehouse.name)
        .bind(warehouse.location.as_deref())
        .bind(warehouse.kind.as_str())
        .bind(warehouse.capacity)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(warehouse)
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !exists(&mut tx, "SELECT 1 AS one FROM warehouses WHERE id = $1", *id.as_uuid()).await? {
            return Err(DomainError::not_found(format!("warehouse {id}")));
        }
        // Stock rows and their ledger entries go with the warehouse.
        sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // -- inventory --------------------------------------------------------

    async fn upsert_item(&self, input: UpsertItem) -> DomainResult<ItemView> {
        input.validate()?;
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let product_row = sqlx::query("SELECT sku, name FROM products WHERE id = $1")
            .bind(*input.product_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("product {}", input.product_id)))?;
        let warehouse_row = sqlx::query("SELECT name FROM warehouses WHERE id = $1")
            .bind(*input.warehouse_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                DomainError::not_found(format!("warehouse {}", input.warehouse_id))
            })?;

        let now = Utc::now();
        let existing = sqlx::query(
            "SELECT id FROM inventory_items WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
        )
        .bind(*input.product_id.as_uuid())
        .bind(*input.warehouse_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let item = match existing {
            Some(row) => {
                let item_id: Uuid = row.try_get("id").map_err(db_err)?;
                sqlx::query(
                    "UPDATE inventory_items SET quantity = $2, reserved = $3, last_updated = $4 WHERE id = $1",
                )
                .bind(item_id)
                .bind(input.quantity)
                .bind(input.reserved)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
                InventoryItem {
                    id: InventoryItemId::from_uuid(item_id),
                    product_id: input.product_id,
                    warehouse_id: input.warehouse_id,
                    quantity: input.quantity,
                    reserved: input.reserved,
                    last_updated: now,
                }
            }
            None => {
                let item = InventoryItem::new(
                    input.product_id,
                    input.warehouse_id,
                    input.quantity,
                    input.reserved,
                    now,
                )?;
                sqlx::query(
                    "INSERT INTO inventory_items (id, product_id, warehouse_id, quantity, reserved, last_updated) VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(*item.id.as_uuid())
                .bind(*item.product_id.as_uuid())
                .bind(*item.warehouse_id.as_uuid())
                .bind(item.quantity)
                .bind(item.reserved)
                .bind(item.last_updated)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
                item
            }
        };
        tx.commit().await.map_err(db_err)?;

        Ok(ItemView {
            id: item.id,
            product_id: item.product_id,
            product_sku: product_row.try_get("sku").map_err(db_err)?,
            product_name: product_row.try_get("name").map_err(db_err)?,
            warehouse_id: item.warehouse_id,
            warehouse_name: warehouse_row.try_get("name").map_err(db_err)?,
            quantity: item.quantity,
            reserved: item.reserved,
            available: item.available(),
            last_updated: item.last_updated,
        })
    }

    async fn item(&self, id: InventoryItemId) -> DomainResult<ItemView> {
        let sql = format!("{ITEM_VIEW_SELECT} WHERE i.id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("inventory item {id}")))?;
        item_view_from_row(&row)
    }

    async fn list_items(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> DomainResult<Page<ItemView>> {
        let pattern = search.map(|s| format!("%{s}%"));
        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM inventory_items i JOIN products p ON p.id = i.product_id JOIN warehouses w ON w.id = i.warehouse_id WHERE ($1::TEXT IS NULL OR p.sku ILIKE $1 OR p.name ILIKE $1 OR w.name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?
        .try_get("count")
        .map_err(db_err)?;

        let sql = format!(
            "{ITEM_VIEW_SELECT} WHERE ($1::TEXT IS NULL OR p.sku ILIKE $1 OR p.name ILIKE $1 OR w.name ILIKE $1) ORDER BY i.last_updated DESC, i.id LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(pattern.as_deref())
            .bind(i64::from(query.limit()))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let items = rows
            .iter()
            .map(item_view_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, &query))
    }

    async fn items_by_warehouse(&self, warehouse_id: WarehouseId) -> DomainResult<Vec<ItemView>> {
        let sql = format!("{ITEM_VIEW_SELECT} WHERE i.warehouse_id = $1 ORDER BY p.name, i.id");
        let rows = sqlx::query(&sql)
            .bind(*warehouse_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(item_view_from_row).collect()
    }

    async fn items_by_product(&self, product_id: ProductId) -> DomainResult<Vec<ItemView>> {
        let sql = format!("{ITEM_VIEW_SELECT} WHERE i.product_id = $1 ORDER BY w.name, i.id");
        let rows = sqlx::query(&sql)
            .bind(*product_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(item_view_from_row).collect()
    }

    async fn low_stock_items(&self) -> DomainResult<Vec<ItemView>> {
        let sql = format!(
            "{ITEM_VIEW_SELECT} WHERE i.quantity <= p.safety_stock ORDER BY i.quantity, p.name"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(item_view_from_row).collect()
    }

    async fn out_of_stock_items(&self) -> DomainResult<Vec<ItemView>> {
        let sql = format!(
            "{ITEM_VIEW_SELECT} WHERE i.quantity - i.reserved <= 0 ORDER BY i.quantity - i.reserved, p.name"
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(item_view_from_row).collect()
    }

    async fn adjust_item(
        &self,
        id: InventoryItemId,
        new_quantity: i32,
        reason: Option<String>,
        performed_by: Option<UserId>,
    ) -> DomainResult<ItemView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let sql = format!("{ITEM_VIEW_SELECT} WHERE i.id = $1 FOR UPDATE OF i");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("inventory item {id}")))?;
        let mut view = item_view_from_row(&row)?;

        let change = plan_set_quantity(view.quantity, new_quantity)?;
        let now = Utc::now();
        sqlx::query("UPDATE inventory_items SET quantity = $2, last_updated = $3 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(change.quantity_after)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let movement = change.into_movement(
            id,
            reason,
            Some(reference::MANUAL_ADJUSTMENT.to_string()),
            None,
            performed_by,
            now,
        );
        insert_movement(&mut tx, &movement).await?;
        tx.commit().await.map_err(db_err)?;

        view.quantity = change.quantity_after;
        view.available = view.quantity - view.reserved;
        view.last_updated = now;
        Ok(view)
    }

    async fn delete_item(&self, id: InventoryItemId) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("inventory item {id}")));
        }
        Ok(())
    }

    // -- movements --------------------------------------------------------

    async fn record_movement(&self, input: RecordMovement) -> DomainResult<MovementView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let sql = format!("{ITEM_VIEW_SELECT} WHERE i.id = $1 FOR UPDATE OF i");
        let row = sqlx::query(&sql)
            .bind(*input.inventory_item_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                DomainError::not_found(format!("inventory item {}", input.inventory_item_id))
            })?;
        let view = item_view_from_row(&row)?;

        let change = plan_movement(view.quantity, input.movement_type, input.quantity)?;
        let now = Utc::now();
        sqlx::query("UPDATE inventory_items SET quantity = $2, last_updated = $3 WHERE id = $1")
            .bind(*input.inventory_item_id.as_uuid())
            .bind(change.quantity_after)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let movement = change.into_movement(
            input.inventory_item_id,
            input.reason,
            input.reference_type,
            input.reference_id,
            input.performed_by,
            now,
        );
        insert_movement(&mut tx, &movement).await?;

        let performed_by_name = match movement.performed_by {
            Some(user_id) => {
                let user_row =
                    sqlx::query("SELECT first_name, last_name FROM users WHERE id = $1")
                        .bind(*user_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(db_err)?;
                match user_row {
                    Some(user_row) => joined_name(
                        user_row.try_get("first_name").map_err(db_err)?,
                        user_row.try_get("last_name").map_err(db_err)?,
                    ),
                    None => None,
                }
            }
            None => None,
        };
        tx.commit().await.map_err(db_err)?;

        Ok(MovementView {
            id: movement.id,
            inventory_item_id: movement.inventory_item_id,
            product_sku: view.product_sku,
            product_name: view.product_name,
            warehouse_name: view.warehouse_name,
            movement_type: movement.movement_type,
            quantity: movement.quantity,
            quantity_before: movement.quantity_before,
            quantity_after: movement.quantity_after,
            reason: movement.reason,
            reference_type: movement.reference_type,
            reference_id: movement.reference_id,
            performed_by_name,
            created_at: movement.created_at,
        })
    }

    async fn movement(&self, id: MovementId) -> DomainResult<MovementView> {
        let sql = format!("{MOVEMENT_VIEW_SELECT} WHERE m.id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found(format!("inventory movement {id}")))?;
        movement_view_from_row(&row)
    }

    async fn list_movements(&self, query: PageQuery) -> DomainResult<Page<MovementView>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM inventory_movements")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("count")
            .map_err(db_err)?;
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} ORDER BY m.created_at DESC, m.id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(query.limit()))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let items = rows
            .iter()
            .map(movement_view_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, &query))
    }

    async fn movements_by_item(
        &self,
        item_id: InventoryItemId,
    ) -> DomainResult<Vec<MovementView>> {
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} WHERE m.inventory_item_id = $1 ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(*item_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(movement_view_from_row).collect()
    }

    async fn movements_by_type(
        &self,
        movement_type: MovementType,
    ) -> DomainResult<Vec<MovementView>> {
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} WHERE m.movement_type = $1 ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(movement_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(movement_view_from_row).collect()
    }

    async fn movements_by_product(
        &self,
        product_id: ProductId,
    ) -> DomainResult<Vec<MovementView>> {
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} WHERE i.product_id = $1 ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(*product_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(movement_view_from_row).collect()
    }

    async fn movements_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> DomainResult<Vec<MovementView>> {
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} WHERE i.warehouse_id = $1 ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(*warehouse_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(movement_view_from_row).collect()
    }

    async fn movements_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<MovementView>> {
        let sql = format!(
            "{MOVEMENT_VIEW_SELECT} WHERE m.created_at BETWEEN $1 AND $2 ORDER BY m.created_at DESC, m.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(movement_view_from_row).collect()
    }

    // -- purchase orders --------------------------------------------------

    async fn create_order(&self, draft: OrderDraft) -> DomainResult<OrderView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        if !exists(
            &mut tx,
            "SELECT 1 AS one FROM suppliers WHERE id = $1",
            *draft.supplier_id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::not_found(format!(
                "supplier {}",
                draft.supplier_id
            )));
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for request in &draft.items {
            let product = product_for_line(&mut tx, request).await?;
            items.push(resolve_item(request, &product)?);
        }

        let now = Utc::now();
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM purchase_orders")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?
            .try_get("count")
            .map_err(db_err)?;
        let mut sequence = count as u64 + 1;
        let number = loop {
            let candidate = order_number(now, sequence);
            let taken = sqlx::query("SELECT 1 AS one FROM purchase_orders WHERE order_number = $1")
                .bind(&candidate)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;
            if taken.is_none() {
                break candidate;
            }
            sequence += 1;
        };

        let order = PurchaseOrder::create(
            number,
            draft.supplier_id,
            draft.created_by,
            draft.status,
            draft.expected_date,
            items,
            now,
        )?;
        insert_order_rows(&mut tx, &order).await?;
        let view = order_view(&mut tx, order.id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(view)
    }

    async fn order(&self, id: PurchaseOrderId) -> DomainResult<OrderView> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        order_view(&mut conn, id).await
    }

    async fn list_orders(&self, query: PageQuery) -> DomainResult<Page<OrderView>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS count FROM purchase_orders")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?
            .try_get("count")
            .map_err(db_err)?;
        let sql = format!(
            "{ORDER_VIEW_SELECT} ORDER BY o.created_at DESC, o.id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(query.limit()))
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut views = rows
            .iter()
            .map(order_view_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        attach_order_items(&mut conn, &mut views).await?;
        Ok(Page::new(views, total as u64, &query))
    }

    async fn orders_by_status(&self, status: OrderStatus) -> DomainResult<Vec<OrderView>> {
        let sql = format!(
            "{ORDER_VIEW_SELECT} WHERE o.status = $1 ORDER BY o.created_at DESC, o.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut views = rows
            .iter()
            .map(order_view_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        attach_order_items(&mut conn, &mut views).await?;
        Ok(views)
    }

    async fn orders_by_supplier(&self, supplier_id: SupplierId) -> DomainResult<Vec<OrderView>> {
        let sql = format!(
            "{ORDER_VIEW_SELECT} WHERE o.supplier_id = $1 ORDER BY o.created_at DESC, o.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(*supplier_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut views = rows
            .iter()
            .map(order_view_from_row)
            .collect::<DomainResult<Vec<_>>>()?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        attach_order_items(&mut conn, &mut views).await?;
        Ok(views)
    }

    async fn update_order(
        &self,
        id: PurchaseOrderId,
        draft: OrderDraft,
    ) -> DomainResult<OrderView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut order = load_order(&mut tx, id, true).await?;
        if !exists(
            &mut tx,
            "SELECT 1 AS one FROM suppliers WHERE id = $1",
            *draft.supplier_id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::not_found(format!(
                "supplier {}",
                draft.supplier_id
            )));
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for request in &draft.items {
            let product = product_for_line(&mut tx, request).await?;
            items.push(resolve_item(request, &product)?);
        }

        order.apply_edit(draft.supplier_id, draft.expected_date, items)?;
        sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        insert_order_items(&mut tx, &order).await?;
        sqlx::query(
            "UPDATE purchase_orders SET supplier_id = $2, expected_date = $3, total_amount = $4 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(*order.supplier_id.as_uuid())
        .bind(order.expected_date)
        .bind(order.total_amount)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        let view = order_view(&mut tx, id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(view)
    }

    async fn set_order_status(
        &self,
        id: PurchaseOrderId,
        status: OrderStatus,
    ) -> DomainResult<OrderView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut order = load_order(&mut tx, id, true).await?;
        order.transition_to(status)?;
        sqlx::query("UPDATE purchase_orders SET status = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(order.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let view = order_view(&mut tx, id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(view)
    }

    async fn receive_order(
        &self,
        id: PurchaseOrderId,
        receipt: ReceiveOrder,
    ) -> DomainResult<OrderView> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut order = load_order(&mut tx, id, true).await?;
        if !exists(
            &mut tx,
            "SELECT 1 AS one FROM warehouses WHERE id = $1",
            *receipt.warehouse_id.as_uuid(),
        )
        .await?
        {
            return Err(DomainError::not_found(format!(
                "warehouse {}",
                receipt.warehouse_id
            )));
        }

        let plan = plan_receipt(&order, &receipt.lines)?;
        let now = Utc::now();
        for line in &plan.lines {
            let existing = sqlx::query(
                "SELECT id, quantity, reserved FROM inventory_items WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
            )
            .bind(*line.product_id.as_uuid())
            .bind(*receipt.warehouse_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;

            let (item_id, before) = match existing {
                Some(row) => {
                    let item_id: Uuid = row.try_get("id").map_err(db_err)?;
                    let quantity: i32 = row.try_get("quantity").map_err(db_err)?;
                    (InventoryItemId::from_uuid(item_id), quantity)
                }
                None => {
                    let item = InventoryItem::empty(line.product_id, receipt.warehouse_id, now);
                    sqlx::query(
                        "INSERT INTO inventory_items (id, product_id, warehouse_id, quantity, reserved, last_updated) VALUES ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(*item.id.as_uuid())
                    .bind(*item.product_id.as_uuid())
                    .bind(*item.warehouse_id.as_uuid())
                    .bind(item.quantity)
                    .bind(item.reserved)
                    .bind(item.last_updated)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                    (item.id, 0)
                }
            };

            let change = plan_movement(before, MovementType::In, line.quantity)?;
            sqlx::query(
                "UPDATE inventory_items SET quantity = $2, last_updated = $3 WHERE id = $1",
            )
            .bind(*item_id.as_uuid())
            .bind(change.quantity_after)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            let movement = change.into_movement(
                item_id,
                Some(plan.reason.clone()),
                Some(reference::PURCHASE_ORDER.to_string()),
                Some(order.id.to_string()),
                receipt.performed_by,
                now,
            );
            insert_movement(&mut tx, &movement).await?;

            sqlx::query(
                "UPDATE purchase_order_items SET quantity_received = $2 WHERE id = $1",
            )
            .bind(*line.order_item_id.as_uuid())
            .bind(line.new_quantity_received)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        order.apply_receipt(&plan);
        sqlx::query("UPDATE purchase_orders SET status = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(order.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let view = order_view(&mut tx, id).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(view)
    }

    async fn delete_order(&self, id: PurchaseOrderId) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let order = load_order(&mut tx, id, true).await?;
        order.ensure_deletable()?;
        sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    // -- dashboard --------------------------------------------------------

    async fn dashboard_stats(&self) -> DomainResult<DashboardStats> {
        let mut stats = DashboardStats::empty();

        let counts = sqlx::query(
            "SELECT (SELECT COUNT(*) FROM suppliers) AS suppliers, (SELECT COUNT(*) FROM products) AS products, (SELECT COUNT(*) FROM warehouses) AS warehouses, (SELECT COUNT(*) FROM purchase_orders) AS orders",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        stats.total_suppliers = counts.try_get::<i64, _>("suppliers").map_err(db_err)? as u64;
        stats.total_products = counts.try_get::<i64, _>("products").map_err(db_err)? as u64;
        stats.total_warehouses = counts.try_get::<i64, _>("warehouses").map_err(db_err)? as u64;
        stats.total_purchase_orders = counts.try_get::<i64, _>("orders").map_err(db_err)? as u64;

        let best = sqlx::query(
            "SELECT s.name, SUM(o.total_amount) AS total FROM purchase_orders o JOIN suppliers s ON s.id = o.supplier_id GROUP BY s.id, s.name ORDER BY total DESC, s.name LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        if let Some(row) = best {
            stats.best_supplier_name = row.try_get("name").map_err(db_err)?;
            stats.best_supplier_total_amount = row.try_get("total").map_err(db_err)?;
        }

        let ascending = sqlx::query(
            "SELECT p.name, SUM(i.quantity)::BIGINT AS quantity FROM inventory_items i JOIN products p ON p.id = i.product_id GROUP BY p.id, p.name ORDER BY quantity, p.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        if let Some(row) = ascending.first() {
            stats.least_stocked_product = row.try_get("name").map_err(db_err)?;
            stats.least_stocked_quantity = row.try_get("quantity").map_err(db_err)?;
        }
        for row in ascending.iter().take(5) {
            let name: String = row.try_get("name").map_err(db_err)?;
            let quantity: i64 = row.try_get("quantity").map_err(db_err)?;
            stats.low_stock_products.push(format!("{name} ({quantity})"));
        }

        let most = sqlx::query(
            "SELECT p.name, SUM(i.quantity)::BIGINT AS quantity FROM inventory_items i JOIN products p ON p.id = i.product_id GROUP BY p.id, p.name ORDER BY quantity DESC, p.name LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        if let Some(row) = most {
            stats.most_stocked_product = row.try_get("name").map_err(db_err)?;
            stats.most_stocked_quantity = row.try_get("quantity").map_err(db_err)?;
        }

        Ok(stats)
    }
}
