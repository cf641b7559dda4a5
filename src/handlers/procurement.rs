// src/handlers/procurement.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::Actor,
        rbac::{
            PermProcurementManage, PermProcurementRead, PermSupplierRatingManage,
            PermSupplierRatingRead, RequirePermission,
        },
    },
    models::procurement::{CreateProcurementOrderPayload, UpdateProcurementStatusPayload},
};

#[derive(Debug, Deserialize)]
pub struct ProcurementListQuery {
    pub supplier_id: Option<i32>,
}

// GET /api/procurement
#[utoipa::path(
    get,
    path = "/api/procurement",
    tag = "Procurement",
    params(("supplier_id" = Option<i32>, Query, description = "Filtra por fornecedor")),
    responses((status = 200, description = "Ordens de compra")),
    security(("api_jwt" = []))
)]
pub async fn list_procurement(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProcurementRead>,
    Query(query): Query<ProcurementListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.procurement_service.list(query.supplier_id).await?;
    Ok(Json(orders))
}

// POST /api/procurement
#[utoipa::path(
    post,
    path = "/api/procurement",
    tag = "Procurement",
    request_body = CreateProcurementOrderPayload,
    responses(
        (status = 201, description = "Ordem de compra criada"),
        (status = 400, description = "Fornecedor sem vínculo com o produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_procurement(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermProcurementManage>,
    Json(payload): Json<CreateProcurementOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let order = app_state.procurement_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// PUT /api/procurement/{procurement_id}/status
#[utoipa::path(
    put,
    path = "/api/procurement/{procurement_id}/status",
    tag = "Procurement",
    request_body = UpdateProcurementStatusPayload,
    params(("procurement_id" = i32, Path, description = "ID da ordem de compra")),
    responses(
        (status = 200, description = "Status atualizado"),
        (status = 409, description = "Ordem já empurrada para o estoque")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_procurement_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProcurementManage>,
    Path(procurement_id): Path<i32>,
    Json(payload): Json<UpdateProcurementStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .procurement_service
        .update_status(procurement_id, payload)
        .await?;
    Ok(Json(order))
}

// DELETE /api/procurement/{procurement_id}
#[utoipa::path(
    delete,
    path = "/api/procurement/{procurement_id}",
    tag = "Procurement",
    params(("procurement_id" = i32, Path, description = "ID da ordem de compra")),
    responses(
        (status = 204, description = "Ordem removida"),
        (status = 409, description = "Ordem já empurrada para o estoque")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_procurement(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermProcurementManage>,
    Path(procurement_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.procurement_service.delete(procurement_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/procurement/{procurement_id}/push-to-inventory
#[utoipa::path(
    post,
    path = "/api/procurement/{procurement_id}/push-to-inventory",
    tag = "Procurement",
    params(("procurement_id" = i32, Path, description = "ID da ordem de compra")),
    responses(
        (status = 200, description = "Quantidade incorporada ao estoque"),
        (status = 409, description = "Ordem não recebida ou já empurrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn push_to_inventory(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermProcurementManage>,
    Path(procurement_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .procurement_service
        .push_to_inventory(&actor, procurement_id)
        .await?;
    Ok(Json(order))
}

// ---
// Avaliações
// ---

// POST /api/procurement/{procurement_id}/review
// Multipart: campos `rating` e `review_text`, arquivos em `images`.
#[utoipa::path(
    post,
    path = "/api/procurement/{procurement_id}/review",
    tag = "Procurement",
    params(("procurement_id" = i32, Path, description = "ID da ordem de compra")),
    responses(
        (status = 201, description = "Avaliação registrada"),
        (status = 200, description = "Avaliação existente atualizada"),
        (status = 400, description = "Rating fora de 1-10, ordem em rascunho ou imagem não suportada")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_review(
    State(app_state): State<AppState>,
    Actor(actor): Actor,
    _guard: RequirePermission<PermSupplierRatingManage>,
    Path(procurement_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut rating: Option<i32> = None;
    let mut review_text: Option<String> = None;
    let mut images: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid(format!("multipart inválido: {e}")))?
    {
        match field.name() {
            Some("rating") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid(format!("campo rating ilegível: {e}")))?;
                rating = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::invalid("rating deve ser um inteiro"))?,
                );
            }
            Some("review_text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid(format!("campo review_text ilegível: {e}")))?;
                if !text.trim().is_empty() {
                    review_text = Some(text);
                }
            }
            Some("images") => {
                let file_name = field
                    .file_name()
                    .map(ToString::to_string)
                    .ok_or_else(|| AppError::invalid("arquivo de imagem sem nome"))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid(format!("falha ao ler imagem: {e}")))?;
                images.push((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let rating = rating.ok_or_else(|| AppError::invalid("o campo rating é obrigatório"))?;
    let (review, is_update) = app_state
        .procurement_service
        .submit_review(&actor, procurement_id, rating, review_text, images)
        .await?;
    let status = if is_update { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(review)))
}

// GET /uploads/{*path} — serve as fotos gravadas em disco.
pub async fn serve_upload(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Os caminhos do banco nunca contêm "..", então qualquer tentativa é lixo.
    if path.split('/').any(|segment| segment == "..") {
        return Err(AppError::not_found("arquivo não encontrado"));
    }

    let full_path = app_state.image_store.resolve(&path);
    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|_| AppError::not_found("arquivo não encontrado"))?;

    let content_type = match full_path.extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    Ok(([(axum::http::header::CONTENT_TYPE, content_type)], bytes))
}

// GET /api/procurement/{procurement_id}/review
#[utoipa::path(
    get,
    path = "/api/procurement/{procurement_id}/review",
    tag = "Procurement",
    params(("procurement_id" = i32, Path, description = "ID da ordem de compra")),
    responses(
        (status = 200, description = "Avaliação da compra"),
        (status = 404, description = "Compra sem avaliação")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_review(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermSupplierRatingRead>,
    Path(procurement_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let review = app_state
        .procurement_service
        .review_of(procurement_id)
        .await?
        .ok_or_else(|| AppError::not_found("esta compra ainda não foi avaliada"))?;
    Ok(Json(review))
}
