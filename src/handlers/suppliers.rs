// src/handlers/suppliers.rs

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
    middleware::rbac::{
        PermSupplierManage, PermSupplierRatingRead, PermSupplierRead, RequirePermission,
    },
    models::supplier::SupplierPayload,
};

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Fornecedores com seus produtos")),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierRead>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.supplier_service.list().await?;
    Ok(Json(suppliers))
}

// GET /api/suppliers/{supplier_id}
#[utoipa::path(
    get,
    path = "/api/suppliers/{supplier_id}",
    tag = "Suppliers",
    params(("supplier_id" = i32, Path, description = "ID do fornecedor")),
    responses((status = 200, description = "Fornecedor encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierRead>,
    Path(supplier_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let supplier = app_state.supplier_service.get(supplier_id).await?;
    Ok(Json(supplier))
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = SupplierPayload,
    responses((status = 201, description = "Fornecedor criado")),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierManage>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let supplier = app_state.supplier_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

// PUT /api/suppliers/{supplier_id}
#[utoipa::path(
    put,
    path = "/api/suppliers/{supplier_id}",
    tag = "Suppliers",
    request_body = SupplierPayload,
    params(("supplier_id" = i32, Path, description = "ID do fornecedor")),
    responses((status = 200, description = "Fornecedor atualizado")),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierManage>,
    Path(supplier_id): Path<i32>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let supplier = app_state.supplier_service.update(supplier_id, payload).await?;
    Ok(Json(supplier))
}

// DELETE /api/suppliers/{supplier_id}
#[utoipa::path(
    delete,
    path = "/api/suppliers/{supplier_id}",
    tag = "Suppliers",
    params(("supplier_id" = i32, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor removido"),
        (status = 409, description = "Fornecedor em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierManage>,
    Path(supplier_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.supplier_service.delete(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/suppliers/{supplier_id}/reviews
#[utoipa::path(
    get,
    path = "/api/suppliers/{supplier_id}/reviews",
    tag = "Suppliers",
    params(("supplier_id" = i32, Path, description = "ID do fornecedor")),
    responses((status = 200, description = "Avaliações de compras do fornecedor")),
    security(("api_jwt" = []))
)]
pub async fn supplier_reviews(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierRatingRead>,
    Path(supplier_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let reviews = app_state
        .procurement_service
        .reviews_of_supplier(supplier_id)
        .await?;
    Ok(Json(reviews))
}
