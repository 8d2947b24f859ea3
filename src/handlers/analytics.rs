use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{parse_timestamp, ApiQuery, DateRangeParams};
use crate::{
    db::UnitOfWork,
    errors::{ErrorResponse, ServiceError},
    services::analytics::{
        AnalyticsService, CategoryRevenue, DailyRevenue, MonthlyRevenue, Period,
        RevenueComparison,
    },
    ApiResponse, AppState,
};

/// Build the analytics Router; paths are relative to `/api/v1`.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/revenue/daily", get(daily_revenue))
        .route("/analytics/revenue/monthly", get(monthly_revenue))
        .route("/analytics/revenue/by-category", get(revenue_by_category))
        .route("/analytics/revenue/compare", get(compare_revenue))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyRevenueQuery {
    /// Number of days to look back (default 7)
    #[param(minimum = 1, maximum = 3650)]
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyRevenueQuery {
    /// Number of 30-day months to look back (default 12)
    #[param(minimum = 1, maximum = 120)]
    pub months: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompareRevenueQuery {
    pub period1_start: String,
    pub period1_end: String,
    pub period2_start: String,
    pub period2_end: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue/daily",
    params(DailyRevenueQuery),
    responses(
        (status = 200, description = "Revenue per calendar day, oldest first", body = ApiResponse<Vec<DailyRevenue>>),
        (status = 400, description = "Invalid window", body = ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn daily_revenue(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DailyRevenueQuery>,
) -> Result<Json<ApiResponse<Vec<DailyRevenue>>>, ServiceError> {
    let days = params.days.unwrap_or(state.config.analytics_default_days);

    let uow = UnitOfWork::begin(&state.db).await?;
    let revenue = AnalyticsService::new(&uow)
        .daily_revenue(days, Utc::now())
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(revenue)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue/monthly",
    params(MonthlyRevenueQuery),
    responses(
        (status = 200, description = "Revenue per (year, month), oldest first", body = ApiResponse<Vec<MonthlyRevenue>>),
        (status = 400, description = "Invalid window", body = ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn monthly_revenue(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<MonthlyRevenueQuery>,
) -> Result<Json<ApiResponse<Vec<MonthlyRevenue>>>, ServiceError> {
    let months = params
        .months
        .unwrap_or(state.config.analytics_default_months);

    let uow = UnitOfWork::begin(&state.db).await?;
    let revenue = AnalyticsService::new(&uow)
        .monthly_revenue(months, Utc::now())
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(revenue)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue/by-category",
    params(DateRangeParams),
    responses(
        (status = 200, description = "Revenue and units per category", body = ApiResponse<Vec<CategoryRevenue>>),
        (status = 400, description = "Invalid date filter", body = ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn revenue_by_category(
    State(state): State<AppState>,
    ApiQuery(dates): ApiQuery<DateRangeParams>,
) -> Result<Json<ApiResponse<Vec<CategoryRevenue>>>, ServiceError> {
    let range = dates.range()?;

    let uow = UnitOfWork::begin(&state.db).await?;
    let revenue = AnalyticsService::new(&uow).revenue_by_category(range).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(revenue)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/revenue/compare",
    params(CompareRevenueQuery),
    responses(
        (status = 200, description = "Revenue of both periods and the relative change", body = ApiResponse<RevenueComparison>),
        (status = 400, description = "Missing or invalid period bounds", body = ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn compare_revenue(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CompareRevenueQuery>,
) -> Result<Json<ApiResponse<RevenueComparison>>, ServiceError> {
    let period1 = Period::new(
        parse_timestamp("period1_start", &params.period1_start)?,
        parse_timestamp("period1_end", &params.period1_end)?,
    )?;
    let period2 = Period::new(
        parse_timestamp("period2_start", &params.period2_start)?,
        parse_timestamp("period2_end", &params.period2_end)?,
    )?;

    let uow = UnitOfWork::begin(&state.db).await?;
    let comparison = AnalyticsService::new(&uow)
        .compare_revenue(period1, period2)
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(comparison)))
}
