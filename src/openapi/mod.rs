use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "E-commerce Admin API",
        version = "0.1.0",
        description = r#"
Back-office API for a single store: catalog maintenance, stock levels with a
full change history, sales recording and revenue analytics.

All resource endpoints live under `/api/v1`. Successful responses are wrapped
in an envelope with `success`, `data` and `meta` fields; failures return an
`ErrorResponse` carrying the request id from the `X-Request-Id` header.

Monetary amounts are serialized as decimal strings.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Categories", description = "Product category endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Inventory", description = "Stock level and history endpoints"),
        (name = "Sales", description = "Sales recording and reporting endpoints"),
        (name = "Analytics", description = "Revenue analytics endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::handlers::categories::create_category,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::update_category,

        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,

        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::low_stock_alerts,
        crate::handlers::inventory::set_inventory_quantity,
        crate::handlers::inventory::inventory_history,

        crate::handlers::sales::create_sale,
        crate::handlers::sales::list_sales,
        crate::handlers::sales::daily_sales,
        crate::handlers::sales::sales_by_product,

        crate::handlers::analytics::daily_revenue,
        crate::handlers::analytics::monthly_revenue,
        crate::handlers::analytics::revenue_by_category,
        crate::handlers::analytics::compare_revenue,

        crate::health::simple_health_check,
        crate::health::readiness_check,
        crate::health::version_info,
    ),
    components(
        schemas(
            crate::ResponseMeta,

            crate::services::catalog::CategoryView,
            crate::services::catalog::CreateCategoryInput,
            crate::services::catalog::UpdateCategoryInput,
            crate::services::catalog::ProductView,
            crate::services::catalog::CreateProductInput,
            crate::services::catalog::UpdateProductInput,

            crate::services::inventory::InventoryView,
            crate::services::inventory::InventoryHistoryView,
            crate::services::inventory::CreateInventoryInput,
            crate::services::inventory::SetQuantityInput,
            crate::services::inventory::LowStockAlert,

            crate::services::sales::SaleView,
            crate::services::sales::CreateSaleInput,

            crate::services::analytics::DailyRevenue,
            crate::services::analytics::DailySales,
            crate::services::analytics::MonthlyRevenue,
            crate::services::analytics::CategoryRevenue,
            crate::services::analytics::ProductSales,
            crate::services::analytics::PeriodRevenue,
            crate::services::analytics::RevenueComparison,

            crate::health::HealthStatus,
            crate::health::ReadinessReport,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}
