use axum::{
    extract::State,
    response::{Json, Response},
    routing::get,
    Router,
};

use super::common::{ApiJson, ApiPath, ApiQuery, created_response, PaginationParams};
use crate::{
    db::UnitOfWork,
    errors::{ErrorResponse, ServiceError},
    services::catalog::{CatalogService, CategoryView, CreateCategoryInput, UpdateCategoryInput},
    ApiResponse, AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", get(get_category).put(update_category))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryView>),
        (status = 400, description = "Invalid category", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryInput>,
) -> Result<Response, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let category = CatalogService::new(&uow).create_category(payload).await?;
    uow.commit().await?;

    Ok(created_response(ApiResponse::success(CategoryView::from(
        category,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(PaginationParams),
    responses(
        (status = 200, description = "Categories ordered by id", body = ApiResponse<Vec<CategoryView>>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<CategoryView>>>, ServiceError> {
    let page = params.page(&state.config)?;
    let uow = UnitOfWork::begin(&state.db).await?;
    let categories = CatalogService::new(&uow).list_categories(page).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(
        categories.into_iter().map(CategoryView::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryView>),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApiResponse<CategoryView>>, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let category = CatalogService::new(&uow).get_category(id).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(category.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryView>),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category name already exists", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateCategoryInput>,
) -> Result<Json<ApiResponse<CategoryView>>, ServiceError> {
    let uow = UnitOfWork::begin(&state.db).await?;
    let category = CatalogService::new(&uow).update_category(id, payload).await?;
    uow.commit().await?;

    Ok(Json(ApiResponse::success(category.into())))
}
