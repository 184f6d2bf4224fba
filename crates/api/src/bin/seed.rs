//! Deterministic sample-data loader.
//!
//! Writes straight through the service layer against whichever store the
//! environment selects, so the API and the seeder can never disagree on
//! validation. Naming derives from indices; re-running skips rows that
//! already exist instead of failing.

use chrono::Utc;
use rust_decimal::Decimal;

use supplyline_api::app::services::select_store;
use supplyline_catalog::{
    NewProduct, NewSupplier, NewWarehouse, Product, Supplier, Warehouse, WarehouseKind,
};
use supplyline_store::Store;

const CATEGORIES: [&str; 5] = [
    "Electronics",
    "Packaging",
    "Raw Materials",
    "Tools",
    "Consumables",
];

#[derive(Debug)]
struct SeedArgs {
    products: u32,
    warehouses: u32,
    suppliers: u32,
}

impl Default for SeedArgs {
    fn default() -> Self {
        Self {
            products: 25,
            warehouses: 3,
            suppliers: 5,
        }
    }
}

impl SeedArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut out = Self::default();
        while let Some(flag) = args.next() {
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {flag}"))?;
            let value: u32 = value
                .parse()
                .map_err(|_| format!("{flag} expects a number, got {value}"))?;
            match flag.as_str() {
                "--products" => out.products = value,
                "--warehouses" => out.warehouses = value,
                "--suppliers" => out.suppliers = value,
                other => return Err(format!("unknown flag: {other}")),
            }
        }
        Ok(out)
    }
}

#[tokio::main]
async fn main() {
    supplyline_observability::init();

    let args = match SeedArgs::parse(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: seed [--products N] [--warehouses N] [--suppliers N]");
            std::process::exit(2);
        }
    };

    let store = select_store().await;
    let now = Utc::now();
    let mut created = 0u32;

    for i in 1..=args.suppliers {
        let supplier = Supplier::create(
            NewSupplier {
                name: format!("Supplier {i}"),
                email: Some(format!("supplier{i}@example.com")),
                phone: Some(format!("+49 30 {:07}", 5_550_000 + i)),
                address: Some(format!("{i} Depot Street")),
                contact_person: Some(format!("Contact Person {i}")),
            },
            now,
        )
        .expect("seed supplier input is valid");
        match store.insert_supplier(supplier).await {
            Ok(_) => created += 1,
            Err(err) => tracing::warn!(error = %err, index = i, "skipping supplier"),
        }
    }

    for i in 1..=args.warehouses {
        let warehouse = Warehouse::create(NewWarehouse {
            name: format!("Warehouse {i}"),
            location: Some(format!("City {i}")),
            kind: (i % 4 == 0).then_some(WarehouseKind::Virtual),
            capacity: None,
        })
        .expect("seed warehouse input is valid");
        match store.insert_warehouse(warehouse).await {
            Ok(_) => created += 1,
            Err(err) => tracing::warn!(error = %err, index = i, "skipping warehouse"),
        }
    }

    for i in 1..=args.products {
        let product = Product::create(
            NewProduct {
                sku: format!("SKU-{i:04}"),
                name: format!("Product {i}"),
                category: Some(CATEGORIES[((i - 1) % 5) as usize].to_string()),
                price: Decimal::new(i64::from(100 + 25 * i), 2),
                safety_stock: (i % 20) as i32,
            },
            now,
        )
        .expect("seed product input is valid");
        match store.insert_product(product).await {
            Ok(_) => created += 1,
            Err(err) => tracing::warn!(error = %err, index = i, "skipping product"),
        }
    }

    tracing::info!(
        created,
        products = args.products,
        warehouses = args.warehouses,
        suppliers = args.suppliers,
        "seeding complete"
    );
}
