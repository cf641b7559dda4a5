// src/handlers/inventory.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Actor,
        rbac::{PermInventoryUpdate, PermProductRead, RequirePermission},
    },
    models::inventory::{
        CreateInventoryItemPayload, InventoryKind, InventoryKindQuery, InventoryListQuery,
        UpdateInventoryQuantityPayload,
    },
};

// GET /api/inventory
#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    params(
        ("inventory_kind" = Option<String>, Query, description = "regular ou fresh_produce"),
        ("page" = Option<i64>, Query, description = "Página (1-based)"),
        ("page_size" = Option<i64>, Query, description = "Tamanho da página"),
        ("seller_id" = Option<i32>, Query, description = "Filtra por seller"),
        ("product_id" = Option<i32>, Query, description = "Filtra por produto"),
        ("product_type" = Option<String>, Query, description = "Filtra por tipo de produto"),
        ("status" = Option<String>, Query, description = "Status do dono do estoque")
    ),
    responses((status = 200, description = "Estoque combinado das duas tabelas")),
    security(("api_jwt" = []))
)]
pub async fn list_inventory(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermInventoryUpdate>,
    Query(kind_query): Query<InventoryKindQuery>,
    Query(query): Query<InventoryListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (items, pagination) = app_state
        .inventory_service
        .list(&actor, kind_query.inventory_kind, &query)
        .await?;
    Ok(Json(json!({ "items": items, "pagination": pagination })))
}

// POST /api/inventory
#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = CreateInventoryItemPayload,
    responses(
        (status = 201, description = "Registro de estoque criado"),
        (status = 400, description = "Seller inválido ou não validado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inventory_item(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermInventoryUpdate>,
    Json(payload): Json<CreateInventoryItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let item = app_state.inventory_service.create_item(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/inventory/{inventory_kind}/{item_id}/quantity
#[utoipa::path(
    put,
    path = "/api/inventory/{inventory_kind}/{item_id}/quantity",
    tag = "Inventory",
    request_body = UpdateInventoryQuantityPayload,
    params(
        ("inventory_kind" = String, Path, description = "regular ou fresh_produce"),
        ("item_id" = i32, Path, description = "ID do registro de estoque")
    ),
    responses(
        (status = 200, description = "Quantidade atualizada"),
        (status = 403, description = "Estoque de outro seller")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_inventory_quantity(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermInventoryUpdate>,
    Path((inventory_kind, item_id)): Path<(InventoryKind, i32)>,
    Json(payload): Json<UpdateInventoryQuantityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let item = app_state
        .inventory_service
        .update_quantity(&actor, inventory_kind, item_id, payload)
        .await?;
    Ok(Json(item))
}

// DELETE /api/inventory/{inventory_kind}/{item_id}
#[utoipa::path(
    delete,
    path = "/api/inventory/{inventory_kind}/{item_id}",
    tag = "Inventory",
    params(
        ("inventory_kind" = String, Path, description = "regular ou fresh_produce"),
        ("item_id" = i32, Path, description = "ID do registro de estoque")
    ),
    responses((status = 204, description = "Registro removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_inventory_item(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermInventoryUpdate>,
    Path((inventory_kind, item_id)): Path<(InventoryKind, i32)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .inventory_service
        .delete_item(&actor, inventory_kind, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "Inventory",
    params(
        ("inventory_kind" = Option<String>, Query, description = "regular ou fresh_produce")
    ),
    responses(
        (status = 200, description = "Itens com disponibilidade positiva, reservas já descontadas")
    ),
    security(("api_jwt" = []))
)]
pub async fn catalog(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProductRead>,
    Query(kind_query): Query<InventoryKindQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = app_state
        .inventory_service
        .catalog(kind_query.inventory_kind)
        .await?;
    Ok(Json(items))
}
