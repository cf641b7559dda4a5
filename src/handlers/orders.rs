// src/handlers/orders.rs

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
    middleware::{
        auth::Actor,
        rbac::{PermOrderCreate, PermOrderRead, PermOrderStatusUpdate, RequirePermission},
    },
    models::order::{CreateOrderPayload, UpdateOrderStatusPayload},
};

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Grupo de pedidos criado, estoque reservado"),
        (status = 400, description = "Linha inválida"),
        (status = 409, description = "Disponibilidade insuficiente ou item expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderCreate>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let group = app_state.order_service.create_order_group(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Pedidos visíveis para o chamador")),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderRead>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list_orders(&actor).await?;
    Ok(Json(orders))
}

// GET /api/orders/{order_id}
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    params(("order_id" = i32, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens"),
        (status = 403, description = "Fora do escopo do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderRead>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order(&actor, order_id).await?;
    Ok(Json(order))
}

// PUT /api/orders/{order_id}/status
#[utoipa::path(
    put,
    path = "/api/orders/{order_id}/status",
    tag = "Orders",
    request_body = UpdateOrderStatusPayload,
    params(("order_id" = i32, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Status atualizado, efeito de estoque aplicado"),
        (status = 409, description = "Pedido em estado terminal")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderStatusUpdate>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.update_status(&actor, order_id, payload).await?;
    Ok(Json(order))
}

// GET /api/order-groups
#[utoipa::path(
    get,
    path = "/api/order-groups",
    tag = "Orders",
    responses((status = 200, description = "Grupos de pedidos visíveis para o chamador")),
    security(("api_jwt" = []))
)]
pub async fn list_order_groups(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderRead>,
) -> Result<impl IntoResponse, AppError> {
    let groups = app_state.order_service.list_groups(&actor).await?;
    Ok(Json(groups))
}

// GET /api/order-groups/{order_group_id}
#[utoipa::path(
    get,
    path = "/api/order-groups/{order_group_id}",
    tag = "Orders",
    params(("order_group_id" = i32, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Grupo com os pedidos e itens"),
        (status = 403, description = "Fora do escopo do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_group(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermOrderRead>,
    Path(order_group_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state.order_service.get_group(&actor, order_group_id).await?;
    Ok(Json(group))
}
