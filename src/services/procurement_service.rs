// src/services/procurement_service.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, ProcurementRepository, ProductRepository, SupplierRepository},
    models::{
        auth::ActorContext,
        inventory::{InventoryKind, OriginType},
        procurement::{
            CreateProcurementOrderPayload, ProcurementOrder, ProcurementOrderResponse,
            ProcurementReviewResponse, ProcurementStatus, UpdateProcurementStatusPayload,
        },
    },
    services::image_store::ImageStore,
};

#[derive(Clone)]
pub struct ProcurementService {
    procurement_repo: ProcurementRepository,
    inventory_repo: InventoryRepository,
    product_repo: ProductRepository,
    supplier_repo: SupplierRepository,
    image_store: ImageStore,
    pool: PgPool,
}

impl ProcurementService {
    pub fn new(
        procurement_repo: ProcurementRepository,
        inventory_repo: InventoryRepository,
        product_repo: ProductRepository,
        supplier_repo: SupplierRepository,
        image_store: ImageStore,
        pool: PgPool,
    ) -> Self {
        Self {
            procurement_repo,
            inventory_repo,
            product_repo,
            supplier_repo,
            image_store,
            pool,
        }
    }

    pub async fn list(
        &self,
        supplier_id: Option<i32>,
    ) -> Result<Vec<ProcurementOrderResponse>, AppError> {
        let orders = self.procurement_repo.list(supplier_id).await?;

        let suppliers: HashMap<i32, String> = self
            .supplier_repo
            .list()
            .await?
            .into_iter()
            .map(|s| (s.supplier_id, s.supplier_name))
            .collect();
        let products: HashMap<i32, String> = self
            .product_repo
            .list()
            .await?
            .into_iter()
            .map(|p| (p.id, p.product_name))
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| to_response(o, &suppliers, &products))
            .collect())
    }

    pub async fn create(
        &self,
        actor: &ActorContext,
        payload: CreateProcurementOrderPayload,
    ) -> Result<ProcurementOrderResponse, AppError> {
        let supplier = self
            .supplier_repo
            .get(&self.pool, payload.supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found("fornecedor não encontrado"))?;
        if !supplier.is_active {
            return Err(AppError::invalid("o fornecedor está inativo"));
        }
        let product = self
            .product_repo
            .get(&self.pool, payload.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("produto não encontrado"))?;

        // A compra só faz sentido para produtos que o fornecedor oferta.
        if self
            .supplier_repo
            .find_link(&self.pool, supplier.supplier_id, product.id)
            .await?
            .is_none()
        {
            return Err(AppError::invalid(
                "o fornecedor não está vinculado a este produto",
            ));
        }

        let status = payload.status.unwrap_or(ProcurementStatus::Draft);
        let order = self
            .procurement_repo
            .create(
                supplier.supplier_id,
                product.id,
                payload.quantity,
                payload.price_per_unit.round_dp(2),
                status.as_str(),
                actor.user_id,
            )
            .await?;

        tracing::info!(
            procurement_id = order.procurement_id,
            supplier_id = supplier.supplier_id,
            "ordem de compra criada"
        );
        Ok(to_response(
            order,
            &HashMap::from([(supplier.supplier_id, supplier.supplier_name)]),
            &HashMap::from([(product.id, product.product_name)]),
        ))
    }

    pub async fn update_status(
        &self,
        procurement_id: i32,
        payload: UpdateProcurementStatusPayload,
    ) -> Result<ProcurementOrderResponse, AppError> {
        let existing = self
            .procurement_repo
            .get(&self.pool, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;

        // Depois do push a ordem está congelada.
        if existing.pushed_to_inventory {
            return Err(AppError::conflict(
                "ordem já empurrada para o estoque não muda mais de status",
            ));
        }

        let order = self
            .procurement_repo
            .update_status(procurement_id, payload.status.as_str())
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;
        self.hydrate(order).await
    }

    pub async fn delete(&self, procurement_id: i32) -> Result<(), AppError> {
        let existing = self
            .procurement_repo
            .get(&self.pool, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;
        if existing.pushed_to_inventory {
            return Err(AppError::conflict(
                "ordem já empurrada para o estoque não pode ser removida",
            ));
        }
        self.procurement_repo.delete(procurement_id).await?;
        Ok(())
    }

    /// Empurra uma compra recebida para o estoque de procurement. Se já
    /// existe linha para o par fornecedor+produto, soma; senão cria. Cada
    /// ordem só pode ser empurrada uma vez, garantido com a linha travada.
    pub async fn push_to_inventory(
        &self,
        actor: &ActorContext,
        procurement_id: i32,
    ) -> Result<ProcurementOrderResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .procurement_repo
            .get_for_update(&mut *tx, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;

        if order.pushed_to_inventory {
            return Err(AppError::conflict("esta ordem já foi empurrada para o estoque"));
        }
        if ProcurementStatus::parse(&order.status) != Some(ProcurementStatus::Received) {
            return Err(AppError::conflict(
                "apenas ordens com status received podem ir para o estoque",
            ));
        }

        let product = self
            .product_repo
            .get(&mut *tx, order.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("produto não encontrado"))?;
        let kind = if product.is_fresh_produce() {
            InventoryKind::FreshProduce
        } else {
            InventoryKind::Regular
        };

        // O vínculo dá a classificação (primary/secondary) gravada como origem.
        let link = self
            .supplier_repo
            .find_link(&mut *tx, order.supplier_id, order.product_id)
            .await?
            .ok_or_else(|| {
                AppError::invalid("o fornecedor não está vinculado a este produto")
            })?;
        let origin = link.supplier_type;

        let existing = self
            .inventory_repo
            .find_procurement_item(&mut *tx, kind, order.product_id, order.supplier_id)
            .await?;
        match existing {
            Some(item) => {
                self.inventory_repo
                    .add_quantity(
                        &mut *tx,
                        kind,
                        item.id,
                        order.quantity,
                        actor.user_id,
                        Some(&origin),
                    )
                    .await?;
            }
            None => {
                self.inventory_repo
                    .insert(
                        &mut *tx,
                        kind,
                        order.product_id,
                        None,
                        Some(order.supplier_id),
                        OriginType::Procurement.as_str(),
                        Some(&origin),
                        order.quantity,
                        order.price_per_unit,
                        actor.user_id,
                    )
                    .await?;
            }
        }

        self.procurement_repo.mark_pushed(&mut *tx, procurement_id).await?;
        tx.commit().await?;

        tracing::info!(procurement_id, kind = kind.as_str(), "compra empurrada para o estoque");
        let order = self
            .procurement_repo
            .get(&self.pool, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;
        self.hydrate(order).await
    }

    // ---
    // Avaliações de compra
    // ---

    /// Grava a avaliação de uma compra. Reenviar substitui a nota, mas o
    /// texto novo entra datado abaixo do anterior e as fotos acumulam.
    /// Devolve também se foi uma atualização (para o status HTTP).
    pub async fn submit_review(
        &self,
        actor: &ActorContext,
        procurement_id: i32,
        rating: i32,
        review_text: Option<String>,
        images: Vec<(String, Vec<u8>)>,
    ) -> Result<(ProcurementReviewResponse, bool), AppError> {
        if !(1..=10).contains(&rating) {
            return Err(AppError::invalid("rating deve estar entre 1 e 10"));
        }

        let order = self
            .procurement_repo
            .get(&self.pool, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;
        if ProcurementStatus::parse(&order.status) == Some(ProcurementStatus::Draft) {
            return Err(AppError::invalid(
                "não é possível avaliar uma ordem em rascunho",
            ));
        }

        // Valida as extensões antes de qualquer escrita.
        for (file_name, _) in &images {
            if crate::services::image_store::allowed_extension(file_name).is_none() {
                return Err(AppError::invalid(
                    "formato de imagem não suportado; use jpg, jpeg, png, webp ou gif",
                ));
            }
        }

        let previous = self.procurement_repo.find_review(procurement_id).await?;
        let is_update = previous.is_some();
        let combined_text = if is_update {
            append_review_text(
                previous.and_then(|p| p.review_text),
                review_text,
                Utc::now(),
            )
        } else {
            review_text
        };

        let review = self
            .procurement_repo
            .upsert_review(
                &self.pool,
                procurement_id,
                order.supplier_id,
                order.product_id,
                rating,
                combined_text.as_deref(),
                actor.user_id,
            )
            .await?;

        for (file_name, bytes) in images {
            let path = self
                .image_store
                .save_review_image(review.review_id, &file_name, &bytes)
                .await?;
            self.procurement_repo
                .add_review_image(&self.pool, review.review_id, &path)
                .await?;
        }

        let all_images = self.procurement_repo.images_of_review(review.review_id).await?;
        tracing::info!(
            procurement_id,
            review_id = review.review_id,
            images = all_images.len(),
            "avaliação de compra registrada"
        );
        Ok((
            ProcurementReviewResponse {
                review_id: review.review_id,
                procurement_id: review.procurement_id,
                supplier_id: review.supplier_id,
                product_id: review.product_id,
                rating: review.rating,
                review_text: review.review_text,
                reviewed_by_user_id: review.reviewed_by_user_id,
                created_at: review.created_at,
                order_status: order.status,
                image_urls: all_images.into_iter().map(|i| to_image_url(i.file_path)).collect(),
            },
            is_update,
        ))
    }

    pub async fn review_of(
        &self,
        procurement_id: i32,
    ) -> Result<Option<ProcurementReviewResponse>, AppError> {
        let Some(review) = self.procurement_repo.find_review(procurement_id).await? else {
            return Ok(None);
        };
        let order = self
            .procurement_repo
            .get(&self.pool, procurement_id)
            .await?
            .ok_or_else(|| AppError::not_found("ordem de compra não encontrada"))?;
        let images = self.procurement_repo.images_of_review(review.review_id).await?;

        Ok(Some(ProcurementReviewResponse {
            review_id: review.review_id,
            procurement_id: review.procurement_id,
            supplier_id: review.supplier_id,
            product_id: review.product_id,
            rating: review.rating,
            review_text: review.review_text,
            reviewed_by_user_id: review.reviewed_by_user_id,
            created_at: review.created_at,
            order_status: order.status,
            image_urls: images.into_iter().map(|i| to_image_url(i.file_path)).collect(),
        }))
    }

    /// Histórico de avaliações de um fornecedor, mais recente primeiro.
    pub async fn reviews_of_supplier(
        &self,
        supplier_id: i32,
    ) -> Result<Vec<ProcurementReviewResponse>, AppError> {
        if self.supplier_repo.get(&self.pool, supplier_id).await?.is_none() {
            return Err(AppError::not_found("fornecedor não encontrado"));
        }

        let reviews = self.procurement_repo.reviews_of_supplier(supplier_id).await?;
        let mut responses = Vec::with_capacity(reviews.len());
        for review in reviews {
            let order = self
                .procurement_repo
                .get(&self.pool, review.procurement_id)
                .await?;
            let images = self.procurement_repo.images_of_review(review.review_id).await?;
            responses.push(ProcurementReviewResponse {
                review_id: review.review_id,
                procurement_id: review.procurement_id,
                supplier_id: review.supplier_id,
                product_id: review.product_id,
                rating: review.rating,
                review_text: review.review_text,
                reviewed_by_user_id: review.reviewed_by_user_id,
                created_at: review.created_at,
                order_status: order.map(|o| o.status).unwrap_or_default(),
                image_urls: images.into_iter().map(|i| to_image_url(i.file_path)).collect(),
            });
        }
        Ok(responses)
    }

    async fn hydrate(&self, order: ProcurementOrder) -> Result<ProcurementOrderResponse, AppError> {
        let supplier_name = self
            .supplier_repo
            .get(&self.pool, order.supplier_id)
            .await?
            .map(|s| s.supplier_name);
        let product_name = self
            .product_repo
            .get(&self.pool, order.product_id)
            .await?
            .map(|p| p.product_name);

        let mut suppliers = HashMap::new();
        if let Some(name) = supplier_name {
            suppliers.insert(order.supplier_id, name);
        }
        let mut products = HashMap::new();
        if let Some(name) = product_name {
            products.insert(order.product_id, name);
        }
        Ok(to_response(order, &suppliers, &products))
    }
}

fn to_response(
    order: ProcurementOrder,
    suppliers: &HashMap<i32, String>,
    products: &HashMap<i32, String>,
) -> ProcurementOrderResponse {
    ProcurementOrderResponse {
        supplier_name: suppliers.get(&order.supplier_id).cloned(),
        product_name: products.get(&order.product_id).cloned(),
        procurement_id: order.procurement_id,
        supplier_id: order.supplier_id,
        product_id: order.product_id,
        quantity: order.quantity,
        price_per_unit: order.price_per_unit,
        procurement_date: order.procurement_date,
        status: order.status,
        pushed_to_inventory: order.pushed_to_inventory,
        created_by_admin_user_id: order.created_by_admin_user_id,
    }
}

fn to_image_url(file_path: String) -> String {
    format!("/uploads/{file_path}")
}

// Texto de reenvio entra datado abaixo do anterior; a nota é substituída.
fn append_review_text(
    previous: Option<String>,
    incoming: Option<String>,
    now: DateTime<Utc>,
) -> Option<String> {
    let Some(incoming) = incoming else {
        return previous;
    };
    let stamp = now.format("%Y-%m-%d %H:%M UTC");
    Some(match previous {
        Some(previous) => format!("{previous}\n\n[{stamp}] {incoming}"),
        None => format!("[{stamp}] {incoming}"),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn moment() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 0).unwrap()
    }

    #[test]
    fn resubmission_appends_dated_text() {
        let combined = append_review_text(
            Some("entrega em dia".to_string()),
            Some("segunda leva veio machucada".to_string()),
            moment(),
        );
        assert_eq!(
            combined.as_deref(),
            Some("entrega em dia\n\n[2026-03-14 15:09 UTC] segunda leva veio machucada")
        );
    }

    #[test]
    fn first_text_on_resubmission_still_gets_dated() {
        let combined =
            append_review_text(None, Some("chegou completo".to_string()), moment());
        assert_eq!(combined.as_deref(), Some("[2026-03-14 15:09 UTC] chegou completo"));
    }

    #[test]
    fn resubmission_without_text_keeps_previous() {
        let combined = append_review_text(Some("ok".to_string()), None, moment());
        assert_eq!(combined.as_deref(), Some("ok"));
        assert_eq!(append_review_text(None, None, moment()), None);
    }
}
