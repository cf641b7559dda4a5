// src/services/inventory_service.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        InventoryRepository, ProductRepository, UserRepository,
        inventory_repo::{InventoryFilter, InventoryItemDetail},
    },
    models::{
        auth::{ActorContext, Role, SellerStatus},
        inventory::{
            CreateInventoryItemPayload, InventoryItemResponse, InventoryKind, InventoryListQuery,
            OriginType, PaginationInfo, UpdateInventoryQuantityPayload,
        },
        product::Product,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    product_repo: ProductRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(
        inventory_repo: InventoryRepository,
        product_repo: ProductRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { inventory_repo, product_repo, user_repo, pool }
    }

    /// Cria um registro de estoque direto de seller. O tipo do produto
    /// decide em qual tabela a linha nasce.
    pub async fn create_item(
        &self,
        actor: &ActorContext,
        payload: CreateInventoryItemPayload,
    ) -> Result<InventoryItemResponse, AppError> {
        let product = self
            .product_repo
            .get(&self.pool, payload.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("produto não encontrado"))?;
        let kind = kind_of(&product);

        let seller_id = self.resolve_seller(actor, payload.seller_id).await?;

        let item = self
            .inventory_repo
            .insert(
                &self.pool,
                kind,
                product.id,
                Some(seller_id),
                None,
                OriginType::SellerDirect.as_str(),
                Some(OriginType::SellerDirect.as_str()),
                payload.quantity,
                Decimal::ZERO,
                actor.user_id,
            )
            .await?;

        tracing::info!(
            item_id = item.id,
            kind = kind.as_str(),
            seller_id,
            "registro de estoque criado"
        );
        self.detail_of(kind, item.id).await
    }

    /// Sobrescreve a quantidade. Sellers só mexem nos próprios itens;
    /// a escrita reinicia o relógio de validade.
    pub async fn update_quantity(
        &self,
        actor: &ActorContext,
        kind: InventoryKind,
        item_id: i32,
        payload: UpdateInventoryQuantityPayload,
    ) -> Result<InventoryItemResponse, AppError> {
        let item = self
            .inventory_repo
            .get(&self.pool, kind, item_id)
            .await?
            .ok_or_else(|| AppError::not_found("registro de estoque não encontrado"))?;

        if !actor.is_admin_like() && item.seller_id != Some(actor.user_id) {
            return Err(AppError::forbidden(
                "você só pode alterar o seu próprio estoque",
            ));
        }
        self.ensure_seller_reach(actor, item.seller_id).await?;

        self.inventory_repo
            .set_quantity(&self.pool, kind, item_id, payload.quantity)
            .await?
            .ok_or_else(|| AppError::not_found("registro de estoque não encontrado"))?;

        self.detail_of(kind, item_id).await
    }

    pub async fn delete_item(
        &self,
        actor: &ActorContext,
        kind: InventoryKind,
        item_id: i32,
    ) -> Result<(), AppError> {
        let item = self
            .inventory_repo
            .get(&self.pool, kind, item_id)
            .await?
            .ok_or_else(|| AppError::not_found("registro de estoque não encontrado"))?;

        if !actor.is_admin_like() && item.seller_id != Some(actor.user_id) {
            return Err(AppError::forbidden(
                "você só pode remover o seu próprio estoque",
            ));
        }
        self.ensure_seller_reach(actor, item.seller_id).await?;

        self.inventory_repo.delete(kind, item_id).await?;
        Ok(())
    }

    /// Listagem administrativa: as duas tabelas combinadas, filtros e
    /// paginação em memória (a tela admin pagina no máximo centenas de
    /// linhas).
    pub async fn list(
        &self,
        actor: &ActorContext,
        kind: Option<InventoryKind>,
        query: &InventoryListQuery,
    ) -> Result<(Vec<InventoryItemResponse>, PaginationInfo), AppError> {
        let mut filter = InventoryFilter {
            seller_id: query.seller_id,
            product_id: query.product_id,
            product_type: query.product_type.clone(),
            status: query.status.clone(),
        };

        // Seller sem papel de admin só enxerga o próprio estoque.
        if !actor.is_admin_like() && actor.has_role(Role::Seller) {
            filter.seller_id = Some(actor.user_id);
        }

        let now = Utc::now();
        let mut rows: Vec<InventoryItemResponse> = Vec::new();
        for k in kinds_to_list(kind) {
            for detail in self.inventory_repo.list_details(k, &filter).await? {
                rows.push(to_response(k, &detail, now));
            }
        }
        rows.sort_by(|a, b| b.entry_date.cmp(&a.entry_date).then(b.id.cmp(&a.id)));

        let page = query.page.unwrap_or(1).max(1);
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let total = rows.len() as i64;
        let total_pages = if total == 0 { 1 } else { (total + page_size - 1) / page_size };

        let start = ((page - 1) * page_size) as usize;
        let paged: Vec<InventoryItemResponse> = rows
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        Ok((paged, PaginationInfo { page, page_size, total, total_pages }))
    }

    /// Catálogo para compradores: só itens com disponibilidade positiva.
    /// A quantidade exposta já desconta as reservas.
    pub async fn catalog(
        &self,
        kind: Option<InventoryKind>,
    ) -> Result<Vec<InventoryItemResponse>, AppError> {
        let now = Utc::now();
        let filter = InventoryFilter::default();

        let mut rows = Vec::new();
        for k in kinds_to_list(kind) {
            for detail in self.inventory_repo.list_details(k, &filter).await? {
                let product = product_of(&detail);
                let available = detail.item.available_quantity(&product, now);
                if available <= 0 {
                    continue;
                }
                let mut response = to_response(k, &detail, now);
                response.quantity = available;
                rows.push(response);
            }
        }
        rows.sort_by(|a, b| a.product_name.cmp(&b.product_name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn detail_of(
        &self,
        kind: InventoryKind,
        item_id: i32,
    ) -> Result<InventoryItemResponse, AppError> {
        let filter = InventoryFilter::default();
        let details = self.inventory_repo.list_details(kind, &filter).await?;
        let detail = details
            .into_iter()
            .find(|d| d.item.id == item_id)
            .ok_or_else(|| AppError::not_found("registro de estoque não encontrado"))?;
        Ok(to_response(kind, &detail, Utc::now()))
    }

    async fn resolve_seller(
        &self,
        actor: &ActorContext,
        requested_seller_id: Option<i32>,
    ) -> Result<i32, AppError> {
        // Seller autenticado ignora o campo e usa o próprio id.
        if !actor.is_admin_like() && actor.has_role(Role::Seller) {
            return Ok(actor.user_id);
        }

        let seller_id = requested_seller_id
            .ok_or_else(|| AppError::invalid("seller_id é obrigatório para admins"))?;
        let seller = self
            .user_repo
            .find_with_roles(seller_id)
            .await?
            .ok_or_else(|| AppError::not_found("seller não encontrado"))?;
        if !seller.has_role(Role::Seller) {
            return Err(AppError::invalid("o usuário informado não tem papel seller"));
        }
        if seller.seller_status() != Some(SellerStatus::Valid) {
            return Err(AppError::invalid("o seller informado ainda não foi validado"));
        }
        if !actor.is_super_admin()
            && seller.user.assigned_admin_user_id != Some(actor.user_id)
        {
            return Err(AppError::forbidden(
                "o seller informado não está atribuído a você",
            ));
        }
        Ok(seller_id)
    }

    // Admin comum só alcança estoque de sellers atribuídos a ele;
    // super_admin alcança todos. Linhas sem seller (procurement) passam.
    async fn ensure_seller_reach(
        &self,
        actor: &ActorContext,
        seller_id: Option<i32>,
    ) -> Result<(), AppError> {
        if actor.is_super_admin() || !actor.is_admin_like() {
            return Ok(());
        }
        let Some(seller_id) = seller_id else {
            return Ok(());
        };
        let seller = self
            .user_repo
            .find_with_roles(seller_id)
            .await?
            .ok_or_else(|| AppError::not_found("seller não encontrado"))?;
        if seller.user.assigned_admin_user_id != Some(actor.user_id) {
            return Err(AppError::forbidden(
                "o seller deste estoque não está atribuído a você",
            ));
        }
        Ok(())
    }
}

fn kinds_to_list(kind: Option<InventoryKind>) -> Vec<InventoryKind> {
    match kind {
        Some(k) => vec![k],
        None => vec![InventoryKind::Regular, InventoryKind::FreshProduce],
    }
}

fn kind_of(product: &Product) -> InventoryKind {
    if product.is_fresh_produce() {
        InventoryKind::FreshProduce
    } else {
        InventoryKind::Regular
    }
}

// Produto sintetizado a partir das colunas juntadas (o join com products
// é interno, os campos sempre vêm preenchidos).
fn product_of(detail: &InventoryItemDetail) -> Product {
    Product {
        id: detail.item.product_id,
        product_name: detail.product_name.clone().unwrap_or_default(),
        product_type: detail.product_type.clone().unwrap_or_default(),
        product_unit: detail.product_unit.clone().unwrap_or_default(),
        validity_days: detail.product_validity_days,
    }
}

fn to_response(
    kind: InventoryKind,
    detail: &InventoryItemDetail,
    now: DateTime<Utc>,
) -> InventoryItemResponse {
    let product = product_of(detail);
    let item = &detail.item;
    let is_expired = item.is_expired(&product, now);
    let effective = item.effective_quantity(&product, now);

    InventoryItemResponse {
        id: item.id,
        inventory_kind: kind,
        product_id: item.product_id,
        product_name: detail.product_name.clone(),
        product_type: detail.product_type.clone(),
        product_unit: detail.product_unit.clone(),
        product_validity_days: detail.product_validity_days,
        seller_id: item.seller_id,
        seller_email: detail.seller_email.clone(),
        seller_status: detail.seller_status.clone(),
        supplier_id: item.supplier_id,
        supplier_name: detail.supplier_name.clone(),
        supplier_email: detail.supplier_email.clone(),
        origin_type: item.origin_type.clone(),
        origin: item.origin.clone(),
        entry_date: item.entry_date,
        quantity: effective,
        estimated_quantity: match kind {
            InventoryKind::FreshProduce => Some(effective),
            InventoryKind::Regular => None,
        },
        stored_quantity: item.stock.value(),
        reserved_quantity: item.reserved_quantity,
        is_expired,
        updated_at: item.updated_at,
        created_by_admin_user_id: item.created_by_admin_user_id,
    }
}
