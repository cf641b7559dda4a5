// src/handlers/auth.rs

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Actor,
    models::auth::{BootstrapAdminPayload, LoginPayload, ProfilePayload, RegisterPayload},
};

// POST /api/auth/bootstrap-admin
#[utoipa::path(
    post,
    path = "/api/auth/bootstrap-admin",
    tag = "Auth",
    request_body = BootstrapAdminPayload,
    responses(
        (status = 201, description = "Administrador inicial criado"),
        (status = 403, description = "Já existem usuários cadastrados")
    )
)]
pub async fn bootstrap_admin(
    State(app_state): State<AppState>,
    Json(payload): Json<BootstrapAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let response = app_state.auth_service.bootstrap_admin(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Usuário cadastrado"),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let response = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let response = app_state.auth_service.login(payload).await?;
    Ok(Json(response))
}

// POST /api/auth/refresh
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "Auth",
    responses(
        (status = 200, description = "Novo par de tokens emitido"),
        (status = 401, description = "Token inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn refresh(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;
    let response = app_state.auth_service.refresh(token).await?;
    Ok(Json(response))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Dados do usuário autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.auth_service.current_user(&actor).await?;
    Ok(Json(response))
}

// PATCH /api/auth/me
#[utoipa::path(
    patch,
    path = "/api/auth/me",
    tag = "Auth",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado"),
        (status = 400, description = "Payload inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    Json(payload): Json<ProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let response = app_state.auth_service.update_profile(&actor, payload).await?;
    Ok(Json(response))
}
