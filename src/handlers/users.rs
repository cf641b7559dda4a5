// src/handlers/users.rs
//
// Administração de usuários, validação de sellers e grupos de
// compradores.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Actor,
        rbac::{
            PermAdminManage, PermBuyerGroupManage, PermBuyerGroupRead, PermSellerValidate,
            PermUserRead, PermUserRoleUpdate, RequirePermission,
        },
    },
    models::auth::{
        AssignBuyerPayload, BuyerGroupOptionsQuery, ReassignSellerPayload,
        SellerValidationPayload, UpdateRolesPayload,
    },
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Lista de usuários")),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermUserRead>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list().await?;
    Ok(Json(users))
}

// GET /api/users/{user_id}
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "Users",
    params(("user_id" = i32, Path, description = "ID do usuário")),
    responses((status = 200, description = "Usuário encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermUserRead>,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get(user_id).await?;
    Ok(Json(user))
}

// PUT /api/users/{user_id}/roles
#[utoipa::path(
    put,
    path = "/api/users/{user_id}/roles",
    tag = "Users",
    request_body = UpdateRolesPayload,
    params(("user_id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papéis atualizados"),
        (status = 403, description = "Permissão insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_roles(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermUserRoleUpdate>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateRolesPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = app_state.user_service.update_roles(&actor, user_id, payload).await?;
    Ok(Json(user))
}

// ---
// Sellers
// ---

// GET /api/sellers
#[utoipa::path(
    get,
    path = "/api/sellers",
    tag = "Sellers",
    responses((status = 200, description = "Sellers visíveis para o chamador")),
    security(("api_jwt" = []))
)]
pub async fn list_sellers(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermSellerValidate>,
) -> Result<impl IntoResponse, AppError> {
    let sellers = app_state.user_service.list_sellers(&actor).await?;
    Ok(Json(sellers))
}

// PUT /api/sellers/{user_id}/validation
#[utoipa::path(
    put,
    path = "/api/sellers/{user_id}/validation",
    tag = "Sellers",
    request_body = SellerValidationPayload,
    params(("user_id" = i32, Path, description = "ID do seller")),
    responses(
        (status = 200, description = "Status de validação atualizado"),
        (status = 400, description = "Status inválido"),
        (status = 403, description = "Seller não atribuído ao chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate_seller(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermSellerValidate>,
    Path(user_id): Path<i32>,
    Json(payload): Json<SellerValidationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.validate_seller(&actor, user_id, payload).await?;
    Ok(Json(user))
}

// PUT /api/sellers/{user_id}/assigned-admin
#[utoipa::path(
    put,
    path = "/api/sellers/{user_id}/assigned-admin",
    tag = "Sellers",
    request_body = ReassignSellerPayload,
    params(("user_id" = i32, Path, description = "ID do seller")),
    responses(
        (status = 200, description = "Seller transferido"),
        (status = 400, description = "Usuário sem papel seller ou responsável sem papel admin"),
        (status = 403, description = "Apenas super_admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn reassign_seller(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermAdminManage>,
    Path(user_id): Path<i32>,
    Json(payload): Json<ReassignSellerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.reassign_seller(&actor, user_id, payload).await?;
    Ok(Json(user))
}

// ---
// Grupos de compradores
// ---

// GET /api/buyer-groups/mine
#[utoipa::path(
    get,
    path = "/api/buyer-groups/mine",
    tag = "BuyerGroups",
    responses((status = 200, description = "Grupo visível para o chamador")),
    security(("api_jwt" = []))
)]
pub async fn my_buyer_group(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermBuyerGroupRead>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state.user_service.buyer_group(&actor).await?;
    Ok(Json(group))
}

// GET /api/buyer-groups/options
#[utoipa::path(
    get,
    path = "/api/buyer-groups/options",
    tag = "BuyerGroups",
    params(
        ("region_id" = Option<i32>, Query, description = "Região de posse a recortar")
    ),
    responses(
        (status = 200, description = "Regiões de posse e recorte da região selecionada"),
        (status = 403, description = "Região fora da posse do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn buyer_group_options(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermBuyerGroupRead>,
    Query(query): Query<BuyerGroupOptionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let options = app_state
        .user_service
        .buyer_group_options(&actor, query.region_id)
        .await?;
    Ok(Json(options))
}

// GET /api/ambassadors/{ambassador_user_id}/buyers
#[utoipa::path(
    get,
    path = "/api/ambassadors/{ambassador_user_id}/buyers",
    tag = "BuyerGroups",
    params(("ambassador_user_id" = i32, Path, description = "ID do embaixador")),
    responses(
        (status = 200, description = "Compradores atribuídos ao embaixador"),
        (status = 403, description = "Embaixador fora do escopo do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn ambassador_buyers(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermBuyerGroupRead>,
    Path(ambassador_user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let buyers = app_state
        .user_service
        .ambassador_buyers(&actor, ambassador_user_id)
        .await?;
    Ok(Json(buyers))
}

// POST /api/buyer-groups/assignments
#[utoipa::path(
    post,
    path = "/api/buyer-groups/assignments",
    tag = "BuyerGroups",
    request_body = AssignBuyerPayload,
    responses(
        (status = 201, description = "Comprador atribuído"),
        (status = 403, description = "Fora do grupo do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_buyer(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermBuyerGroupManage>,
    Json(payload): Json<AssignBuyerPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.assign_buyer(&actor, payload).await?;
    Ok(StatusCode::CREATED)
}

// DELETE /api/buyer-groups/assignments
#[utoipa::path(
    delete,
    path = "/api/buyer-groups/assignments",
    tag = "BuyerGroups",
    request_body = AssignBuyerPayload,
    responses(
        (status = 204, description = "Atribuição removida"),
        (status = 404, description = "Atribuição inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_buyer(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermBuyerGroupManage>,
    Json(payload): Json<AssignBuyerPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.remove_buyer(&actor, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
