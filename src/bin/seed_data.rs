//! Seed data script - populates the database with demo catalog, stock and sales
//!
//! Run with: cargo run --bin seed-data -- --reset --seed 42
//!
//! This creates:
//! - 5 categories with 5 products each
//! - one inventory row per product (0-100 units, threshold 10)
//! - random sales spread over the last N days, recorded through the normal
//!   sale path so stock and history stay consistent

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use sea_orm::EntityTrait;
use tracing::info;

use ecommerce_admin_api::{
    config,
    db::{self, UnitOfWork},
    entities::{
        category,
        inventory::{self, DEFAULT_LOW_STOCK_THRESHOLD},
        inventory_history, product, sale,
    },
    errors::ServiceError,
    services::{
        catalog::{CatalogService, CreateCategoryInput, CreateProductInput},
        inventory::{CreateInventoryInput, InventoryService},
        sales::{CreateSaleInput, SalesService},
    },
};

const CATEGORIES: [&str; 5] = ["Electronics", "Clothing", "Books", "Home & Kitchen", "Sports"];
const PRODUCTS_PER_CATEGORY: usize = 5;

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Populate the database with demo data")]
struct Args {
    /// Database to seed; falls back to the configured database_url
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Spread sales over this many days ending now
    #[arg(long, default_value_t = 90)]
    days: i64,

    /// Number of sales to attempt
    #[arg(long, default_value_t = 200)]
    sales: usize,

    /// RNG seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,

    /// Delete existing rows before seeding
    #[arg(long)]
    reset: bool,
}

#[derive(Debug, Default)]
struct SeedSummary {
    categories: usize,
    products: usize,
    sales: usize,
    skipped_sales: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing("info", false);
    let args = Args::parse();

    let database_url = match args.database_url.clone() {
        Some(url) => url,
        None => config::load_config()?.database_url,
    };

    info!("Connecting to database: {}", database_url);
    let pool = db::establish_connection(&database_url).await?;
    db::run_migrations(&pool).await?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // One unit of work: any failure leaves the database untouched.
    let uow = UnitOfWork::begin(&pool).await?;
    if args.reset {
        reset(&uow).await.context("failed to clear existing data")?;
    }
    let summary = seed(&uow, &args, &mut rng).await?;
    uow.commit().await?;

    info!(
        categories = summary.categories,
        products = summary.products,
        sales = summary.sales,
        skipped_sales = summary.skipped_sales,
        "Seed data complete"
    );
    info!("Try: curl http://localhost:8080/api/v1/analytics/revenue/daily?days=30");

    db::close_pool(pool).await?;
    Ok(())
}

async fn reset(uow: &UnitOfWork) -> Result<(), ServiceError> {
    info!("Removing existing rows");
    sale::Entity::delete_many().exec(uow.conn()).await?;
    inventory_history::Entity::delete_many()
        .exec(uow.conn())
        .await?;
    inventory::Entity::delete_many().exec(uow.conn()).await?;
    product::Entity::delete_many().exec(uow.conn()).await?;
    category::Entity::delete_many().exec(uow.conn()).await?;
    Ok(())
}

async fn seed(
    uow: &UnitOfWork,
    args: &Args,
    rng: &mut StdRng,
) -> Result<SeedSummary, ServiceError> {
    let catalog = CatalogService::new(uow);
    let inventory = InventoryService::new(uow);
    let sales = SalesService::new(uow);
    let mut summary = SeedSummary::default();
    let mut products = Vec::new();

    for name in CATEGORIES {
        let category = catalog
            .create_category(CreateCategoryInput {
                name: name.to_string(),
                description: Some(format!("{} department", name)),
            })
            .await?;
        summary.categories += 1;

        for i in 1..=PRODUCTS_PER_CATEGORY {
            let product = catalog
                .create_product(CreateProductInput {
                    name: format!("{} Product {}", name, i),
                    description: Some(format!("Demo item {} in {}", i, name)),
                    price: Decimal::new(rng.gen_range(1000..100000), 2),
                    category_id: category.id,
                })
                .await?;

            inventory
                .create_inventory(CreateInventoryInput {
                    product_id: product.id,
                    quantity: rng.gen_range(0..=100),
                    low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
                })
                .await?;

            summary.products += 1;
            products.push(product);
        }
    }

    if products.is_empty() || args.days < 1 {
        return Ok(summary);
    }

    let now = Utc::now();
    for _ in 0..args.sales {
        let product = &products[rng.gen_range(0..products.len())];
        let quantity = rng.gen_range(1..=5);
        let sale_date = now
            - Duration::days(rng.gen_range(0..args.days))
            - Duration::minutes(rng.gen_range(0..24 * 60));

        let result = sales
            .record_sale(CreateSaleInput {
                product_id: product.id,
                quantity,
                total_amount: product.price * Decimal::from(quantity),
                sale_date: Some(sale_date),
            })
            .await;

        match result {
            Ok(_) => summary.sales += 1,
            Err(ServiceError::InsufficientStock(_)) => summary.skipped_sales += 1,
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}
