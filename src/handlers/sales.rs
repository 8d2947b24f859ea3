use axum::{
    extract::State,
    response::{Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{ApiJson, ApiQuery, created_response, DateRangeParams, PaginationParams};
use crate::{
    db::UnitOfWork,
    errors::{ErrorResponse, ServiceError},
    services::{
        analytics::{AnalyticsService, DailySales, ProductSales},
        sales::{CreateSaleInput, SaleFilter, SaleView, SalesService},
    },
    ApiResponse, AppState,
};

pub fn sales_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/daily", get(daily_sales))
        .route("/sales/by-product", get(sales_by_product))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaleProductFilter {
    /// Only sales of this product
    pub product_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DaysQuery {
    /// Lookback window in days ending now (default 7)
    #[param(minimum = 1, maximum = 3650)]
    pub days: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/sales",
    request_body = CreateSaleInput,
    responses(
        (status = 201, description = "Sale recorded and stock decremented", body = ApiResponse<SaleView>),
        (status = 400, description = "Non-positive quantity or amount", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Inventory changed concurrently", body = ErrorResponse),
        (status = 422, description = "Insufficient stock", body = ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateSaleInput>,
) -> Result<Response, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let sale = SalesService::new(&uow).record_sale(payload).await?;
    uow.commit().await?;

    Ok(created_response(ApiResponse::success(SaleView::from(sale))))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales",
    params(PaginationParams, DateRangeParams, SaleProductFilter),
    responses(
        (status = 200, description = "Sales, newest first", body = ApiResponse<Vec<SaleView>>),
        (status = 400, description = "Invalid date filter", body = ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(dates): ApiQuery<DateRangeParams>,
    ApiQuery(product): ApiQuery<SaleProductFilter>,
) -> Result<Json<ApiResponse<Vec<SaleView>>>, ServiceError> {
    let page = params.page(&state.config)?;
    let filter = SaleFilter {
        range: dates.range()?,
        product_id: product.product_id,
    };

    let uow = UnitOfWork::begin(&state.db).await?;
    let sales = SalesService::new(&uow).list_sales(filter, page).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(
        sales.into_iter().map(SaleView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/daily",
    params(DaysQuery),
    responses(
        (status = 200, description = "Per-day sales totals, oldest first", body = ApiResponse<Vec<DailySales>>),
        (status = 400, description = "Invalid window", body = ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn daily_sales(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DaysQuery>,
) -> Result<Json<ApiResponse<Vec<DailySales>>>, ServiceError> {
    let days = query.days.unwrap_or(state.config.analytics_default_days);

    let uow = UnitOfWork::begin(&state.db).await?;
    let summary = AnalyticsService::new(&uow)
        .daily_sales(days, Utc::now())
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sales/by-product",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Sales totals per product", body = ApiResponse<Vec<ProductSales>>),
        (status = 400, description = "Invalid date filter", body = ErrorResponse)
    ),
    tag = "Sales"
)]
pub async fn sales_by_product(
    State(state): State<AppState>,
    ApiQuery(dates): ApiQuery<DateRangeParams>,
) -> Result<Json<ApiResponse<Vec<ProductSales>>>, ServiceError> {
    let range = dates.range()?;

    let uow = UnitOfWork::begin(&state.db).await?;
    let totals = AnalyticsService::new(&uow).revenue_by_product(range).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(totals)))
}
