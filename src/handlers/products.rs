use axum::{
    extract::State,
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::common::{ApiJson, ApiPath, ApiQuery, created_response, PaginationParams};
use crate::{
    db::UnitOfWork,
    errors::{ErrorResponse, ServiceError},
    services::catalog::{CatalogService, CreateProductInput, ProductView, UpdateProductInput},
    ApiResponse, AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilters {
    /// Only products in this category
    pub category_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid product", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateProductInput>,
) -> Result<Response, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let product = CatalogService::new(&uow).create_product(payload).await?;
    uow.commit().await?;

    Ok(created_response(ApiResponse::success(ProductView::from(
        product,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PaginationParams, ProductFilters),
    responses(
        (status = 200, description = "Products ordered by id", body = ApiResponse<Vec<ProductView>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
    ApiQuery(filters): ApiQuery<ProductFilters>,
) -> Result<Json<ApiResponse<Vec<ProductView>>>, ServiceError> {
    let page = params.page(&state.config)?;
    let uow = UnitOfWork::begin(&state.db).await?;
    let products = CatalogService::new(&uow)
        .list_products(filters.category_id, page)
        .await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(
        products.into_iter().map(ProductView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let product = CatalogService::new(&uow).get_product(id).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(product.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Product or category not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateProductInput>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let product = CatalogService::new(&uow).update_product(id, payload).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(product.into())))
}
