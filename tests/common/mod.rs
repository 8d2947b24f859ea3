#![allow(dead_code)]

use std::str::FromStr;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use ecommerce_admin_api::{
    build_router,
    config::AppConfig,
    db::{self, DbConfig, UnitOfWork},
    entities::{category, inventory, product, sale},
    services::{
        catalog::{CatalogService, CreateCategoryInput, CreateProductInput},
        inventory::{CreateInventoryInput, InventoryService},
        sales::{CreateSaleInput, SalesService},
    },
    AppState,
};

/// Helper harness for spinning up the full router over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        // A single long-lived connection keeps the in-memory database alive.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_with_config(&DbConfig::from(&cfg))
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(pool, cfg);
        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };
        let request = builder.body(body).expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn begin(&self) -> UnitOfWork {
        UnitOfWork::begin(&self.state.db)
            .await
            .expect("begin unit of work")
    }

    pub async fn seed_category(&self, name: &str) -> category::Model {
        let uow = self.begin().await;
        let model = CatalogService::new(&uow)
            .create_category(CreateCategoryInput {
                name: name.to_string(),
                description: None,
            })
            .await
            .expect("seed category");
        uow.commit().await.expect("commit category");
        model
    }

    pub async fn seed_product(&self, category_id: i32, name: &str, price: Decimal) -> product::Model {
        let uow = self.begin().await;
        let model = CatalogService::new(&uow)
            .create_product(CreateProductInput {
                name: name.to_string(),
                description: None,
                price,
                category_id,
            })
            .await
            .expect("seed product");
        uow.commit().await.expect("commit product");
        model
    }

    pub async fn seed_inventory(
        &self,
        product_id: i32,
        quantity: i32,
        low_stock_threshold: i32,
    ) -> inventory::Model {
        let uow = self.begin().await;
        let model = InventoryService::new(&uow)
            .create_inventory(CreateInventoryInput {
                product_id,
                quantity,
                low_stock_threshold,
            })
            .await
            .expect("seed inventory");
        uow.commit().await.expect("commit inventory");
        model
    }

    /// Category, product and stock in one call.
    pub async fn seed_stocked_product(
        &self,
        category: &str,
        name: &str,
        price: Decimal,
        quantity: i32,
    ) -> product::Model {
        let category = self.seed_category(category).await;
        let product = self.seed_product(category.id, name, price).await;
        self.seed_inventory(product.id, quantity, 10).await;
        product
    }

    pub async fn seed_sale(
        &self,
        product_id: i32,
        quantity: i32,
        total_amount: Decimal,
        sale_date: DateTime<Utc>,
    ) -> sale::Model {
        let uow = self.begin().await;
        let model = SalesService::new(&uow)
            .record_sale(CreateSaleInput {
                product_id,
                quantity,
                total_amount,
                sale_date: Some(sale_date),
            })
            .await
            .expect("seed sale");
        uow.commit().await.expect("commit sale");
        model
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimals travel as strings; parse them for numeric comparison.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {}", other),
    }
}

pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("valid rfc3339 timestamp")
        .with_timezone(&Utc)
}
