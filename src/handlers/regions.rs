// src/handlers/regions.rs

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
    middleware::rbac::{PermAdminManage, RequirePermission},
    models::region::{RegionDefaultsPayload, RegionPayload, RegroupLocalPayload},
};

// GET /api/regions
#[utoipa::path(
    get,
    path = "/api/regions",
    tag = "Regions",
    responses((status = 200, description = "Todas as regiões com seus padrões")),
    security(("api_jwt" = []))
)]
pub async fn list_regions(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
) -> Result<impl IntoResponse, AppError> {
    let regions = app_state.region_service.list().await?;
    Ok(Json(regions))
}

// GET /api/regions/{region_id}
#[utoipa::path(
    get,
    path = "/api/regions/{region_id}",
    tag = "Regions",
    params(("region_id" = i32, Path, description = "ID da região")),
    responses((status = 200, description = "Região encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_region(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Path(region_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let region = app_state.region_service.get(region_id).await?;
    Ok(Json(region))
}

// POST /api/regions
#[utoipa::path(
    post,
    path = "/api/regions",
    tag = "Regions",
    request_body = RegionPayload,
    responses(
        (status = 201, description = "Região criada"),
        (status = 400, description = "Hierarquia inválida"),
        (status = 409, description = "Nome duplicado para o tipo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_region(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Json(payload): Json<RegionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let region = app_state.region_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(region)))
}

// PUT /api/regions/{region_id}
#[utoipa::path(
    put,
    path = "/api/regions/{region_id}",
    tag = "Regions",
    request_body = RegionPayload,
    params(("region_id" = i32, Path, description = "ID da região")),
    responses(
        (status = 200, description = "Região atualizada"),
        (status = 400, description = "Hierarquia inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_region(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Path(region_id): Path<i32>,
    Json(payload): Json<RegionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let region = app_state.region_service.update(region_id, payload).await?;
    Ok(Json(region))
}

// DELETE /api/regions/{region_id}
#[utoipa::path(
    delete,
    path = "/api/regions/{region_id}",
    tag = "Regions",
    params(("region_id" = i32, Path, description = "ID da região")),
    responses(
        (status = 204, description = "Região removida"),
        (status = 409, description = "Região com sub-regiões")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_region(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Path(region_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.region_service.delete(region_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/regions/{region_id}/defaults
#[utoipa::path(
    put,
    path = "/api/regions/{region_id}/defaults",
    tag = "Regions",
    request_body = RegionDefaultsPayload,
    params(("region_id" = i32, Path, description = "ID da região")),
    responses(
        (status = 200, description = "Responsáveis padrão definidos"),
        (status = 400, description = "Usuário sem o papel exigido")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_region_defaults(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Path(region_id): Path<i32>,
    Json(payload): Json<RegionDefaultsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let region = app_state.region_service.set_defaults(region_id, payload).await?;
    Ok(Json(region))
}

// POST /api/regions/regroup-locals
#[utoipa::path(
    post,
    path = "/api/regions/regroup-locals",
    tag = "Regions",
    request_body = RegroupLocalPayload,
    responses(
        (status = 201, description = "Nova minor criada e locals movidas"),
        (status = 400, description = "Locals fora da major informada")
    ),
    security(("api_jwt" = []))
)]
pub async fn regroup_locals(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermAdminManage>,
    Json(payload): Json<RegroupLocalPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let minor = app_state.region_service.regroup_locals(payload).await?;
    Ok((StatusCode::CREATED, Json(minor)))
}
