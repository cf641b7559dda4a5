// src/handlers/products.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermProductManage, PermProductRead, RequirePermission},
    models::product::{ProductPayload, ProductTypePayload},
};

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Catálogo de produtos")),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductRead>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list().await?;
    Ok(Json(products))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado"),
        (status = 400, description = "Tipo de produto não cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductManage>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state.product_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{product_id}
#[utoipa::path(
    put,
    path = "/api/products/{product_id}",
    tag = "Products",
    request_body = ProductPayload,
    params(("product_id" = i32, Path, description = "ID do produto")),
    responses((status = 200, description = "Produto atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductManage>,
    Path(product_id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product = app_state.product_service.update(product_id, payload).await?;
    Ok(Json(product))
}

// DELETE /api/products/{product_id}
#[utoipa::path(
    delete,
    path = "/api/products/{product_id}",
    tag = "Products",
    params(("product_id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 409, description = "Produto em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductManage>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Tipos de produto
// ---

// GET /api/product-types
#[utoipa::path(
    get,
    path = "/api/product-types",
    tag = "Products",
    responses((status = 200, description = "Tipos de produto cadastrados")),
    security(("api_jwt" = []))
)]
pub async fn list_product_types(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductRead>,
) -> Result<impl IntoResponse, AppError> {
    let types = app_state.product_service.list_types().await?;
    Ok(Json(types))
}

// POST /api/product-types
#[utoipa::path(
    post,
    path = "/api/product-types",
    tag = "Products",
    request_body = ProductTypePayload,
    responses(
        (status = 201, description = "Tipo criado"),
        (status = 409, description = "Tipo duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_type(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductManage>,
    Json(payload): Json<ProductTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let product_type = app_state.product_service.create_type(payload).await?;
    Ok((StatusCode::CREATED, Json(product_type)))
}

// DELETE /api/product-types/{product_type_id}
#[utoipa::path(
    delete,
    path = "/api/product-types/{product_type_id}",
    tag = "Products",
    params(("product_type_id" = i32, Path, description = "ID do tipo")),
    responses((status = 204, description = "Tipo removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_product_type(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductManage>,
    Path(product_type_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete_type(product_type_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
