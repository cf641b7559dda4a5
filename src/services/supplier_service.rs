// src/services/supplier_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ProductRepository, SupplierRepository},
    models::supplier::{SupplierPayload, SupplierProductLinkPayload, SupplierResponse},
};

#[derive(Clone)]
pub struct SupplierService {
    supplier_repo: SupplierRepository,
    product_repo: ProductRepository,
    pool: PgPool,
}

impl SupplierService {
    pub fn new(
        supplier_repo: SupplierRepository,
        product_repo: ProductRepository,
        pool: PgPool,
    ) -> Self {
        Self { supplier_repo, product_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<SupplierResponse>, AppError> {
        let suppliers = self.supplier_repo.list().await?;
        let mut responses = Vec::with_capacity(suppliers.len());
        for supplier in suppliers {
            let product_links = self.supplier_repo.links_of(supplier.supplier_id).await?;
            responses.push(SupplierResponse { supplier, product_links });
        }
        Ok(responses)
    }

    pub async fn get(&self, supplier_id: i32) -> Result<SupplierResponse, AppError> {
        let supplier = self
            .supplier_repo
            .get(&self.pool, supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found("fornecedor não encontrado"))?;
        let product_links = self.supplier_repo.links_of(supplier_id).await?;
        Ok(SupplierResponse { supplier, product_links })
    }

    pub async fn create(&self, payload: SupplierPayload) -> Result<SupplierResponse, AppError> {
        let links = self.validate_links(&payload.product_links).await?;

        let mut tx = self.pool.begin().await?;
        let supplier = self
            .supplier_repo
            .create(
                &mut *tx,
                &payload.supplier_name,
                payload.email.as_deref(),
                payload.address_line1.as_deref(),
                payload.address_line2.as_deref(),
                payload.address_line3.as_deref(),
                payload.phone_number.as_deref(),
                payload.is_active.unwrap_or(true),
            )
            .await?;
        self.supplier_repo
            .replace_links(&mut tx, supplier.supplier_id, &links)
            .await?;
        tx.commit().await?;

        tracing::info!(supplier_id = supplier.supplier_id, "fornecedor criado");
        self.get(supplier.supplier_id).await
    }

    pub async fn update(
        &self,
        supplier_id: i32,
        payload: SupplierPayload,
    ) -> Result<SupplierResponse, AppError> {
        let links = self.validate_links(&payload.product_links).await?;

        let mut tx = self.pool.begin().await?;
        let supplier = self
            .supplier_repo
            .update(
                &mut *tx,
                supplier_id,
                &payload.supplier_name,
                payload.email.as_deref(),
                payload.address_line1.as_deref(),
                payload.address_line2.as_deref(),
                payload.address_line3.as_deref(),
                payload.phone_number.as_deref(),
                payload.is_active.unwrap_or(true),
            )
            .await?
            .ok_or_else(|| AppError::not_found("fornecedor não encontrado"))?;
        self.supplier_repo
            .replace_links(&mut tx, supplier.supplier_id, &links)
            .await?;
        tx.commit().await?;

        self.get(supplier_id).await
    }

    pub async fn delete(&self, supplier_id: i32) -> Result<(), AppError> {
        match self.supplier_repo.delete(supplier_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::not_found("fornecedor não encontrado")),
            Err(AppError::DatabaseError(sqlx::Error::Database(db_err)))
                if db_err.is_foreign_key_violation() =>
            {
                Err(AppError::conflict(
                    "o fornecedor está em uso por compras, estoque ou pedidos",
                ))
            }
            Err(err) => Err(err),
        }
    }

    async fn validate_links(
        &self,
        links: &[SupplierProductLinkPayload],
    ) -> Result<Vec<(i32, String)>, AppError> {
        let mut validated = Vec::with_capacity(links.len());
        for link in links {
            let supplier_type = match link.supplier_type.as_deref() {
                None | Some("primary") => "primary",
                Some("secondary") => "secondary",
                Some(other) => {
                    return Err(AppError::invalid(format!(
                        "supplier_type '{other}' inválido; use primary ou secondary"
                    )));
                }
            };
            if self.product_repo.get(&self.pool, link.product_id).await?.is_none() {
                return Err(AppError::not_found(format!(
                    "produto {} não encontrado",
                    link.product_id
                )));
            }
            validated.push((link.product_id, supplier_type.to_string()));
        }
        Ok(validated)
    }
}
