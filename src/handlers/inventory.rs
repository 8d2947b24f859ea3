use axum::{
    body::Bytes,
    extract::State,
    response::{Json, Response},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{ApiJson, ApiPath, ApiQuery, created_response, PaginationParams};
use crate::{
    db::UnitOfWork,
    errors::{ErrorResponse, ServiceError},
    services::inventory::{
        CreateInventoryInput, InventoryHistoryView, InventoryService, InventoryView,
        LowStockAlert, SetQuantityInput,
    },
    ApiResponse, AppState,
};

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory).post(create_inventory))
        .route("/inventory/alerts", get(low_stock_alerts))
        .route("/inventory/history/:product_id", get(inventory_history))
        .route("/inventory/:product_id", put(set_inventory_quantity))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryInput,
    responses(
        (status = 201, description = "Inventory created", body = ApiResponse<InventoryView>),
        (status = 400, description = "Negative quantity or threshold", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Inventory already exists for the product", body = ErrorResponse)
    ),
    tag = "Inventory"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateInventoryInput>,
) -> Result<Response, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let inventory = InventoryService::new(&uow).create_inventory(payload).await?;
    uow.commit().await?;

    Ok(created_response(ApiResponse::success(InventoryView::from(
        inventory,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(PaginationParams),
    responses(
        (status = 200, description = "Inventory rows ordered by id", body = ApiResponse<Vec<InventoryView>>)
    ),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<InventoryView>>>, ServiceError> {
    let page = params.page(&state.config)?;
    let uow = UnitOfWork::begin(&state.db).await?;
    let rows = InventoryService::new(&uow).list_inventory(page).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(
        rows.into_iter().map(InventoryView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/alerts",
    responses(
        (status = 200, description = "Products at or below their low-stock threshold", body = ApiResponse<Vec<LowStockAlert>>)
    ),
    tag = "Inventory"
)]
pub async fn low_stock_alerts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LowStockAlert>>>, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let alerts = InventoryService::new(&uow).low_stock_alerts().await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(alerts)))
}

/// Quantity override passed on the query string.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SetQuantityQuery {
    /// New on-hand quantity
    #[param(minimum = 0)]
    pub quantity: Option<i32>,
    /// Recorded on the history entry
    pub reason: Option<String>,
}

impl SetQuantityQuery {
    /// Query parameters win; without them the body must hold a JSON
    /// `SetQuantityInput`.
    fn resolve(self, body: &[u8]) -> Result<SetQuantityInput, ServiceError> {
        match (self.quantity, self.reason) {
            (Some(quantity), Some(reason)) => Ok(SetQuantityInput { quantity, reason }),
            (None, None) if !body.is_empty() => serde_json::from_slice(body)
                .map_err(|e| ServiceError::ValidationError(format!("invalid body: {}", e))),
            _ => Err(ServiceError::ValidationError(
                "quantity and reason are both required".to_string(),
            )),
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/{product_id}",
    params(
        ("product_id" = i32, Path, description = "Product whose inventory is overridden"),
        SetQuantityQuery
    ),
    request_body(content = SetQuantityInput, description = "Used when the query string carries no override"),
    responses(
        (status = 200, description = "Quantity replaced and history recorded", body = ApiResponse<InventoryView>),
        (status = 400, description = "Negative quantity or missing reason", body = ErrorResponse),
        (status = 404, description = "No inventory for the product", body = ErrorResponse),
        (status = 409, description = "Inventory changed concurrently", body = ErrorResponse)
    ),
    tag = "Inventory"
)]
pub async fn set_inventory_quantity(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i32>,
    ApiQuery(query): ApiQuery<SetQuantityQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<InventoryView>>, ServiceError> {
    let input = query.resolve(&body)?;

    let uow = UnitOfWork::begin(&state.db).await?;
    let inventory = InventoryService::new(&uow)
        .set_quantity(product_id, input)
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(inventory.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/history/{product_id}",
    params(
        ("product_id" = i32, Path, description = "Product whose inventory history is listed"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "History entries, newest first", body = ApiResponse<Vec<InventoryHistoryView>>),
        (status = 404, description = "No inventory for the product", body = ErrorResponse)
    ),
    tag = "Inventory"
)]
pub async fn inventory_history(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<i32>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<InventoryHistoryView>>>, ServiceError> {
    let page = params.page(&state.config)?;
    let uow = UnitOfWork::begin(&state.db).await?;
    let history = InventoryService::new(&uow).history(product_id, page).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(
        history.into_iter().map(InventoryHistoryView::from).collect(),
    )))
}
