// src/services/product_service.rs

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::product::{Product, ProductPayload, ProductType, ProductTypePayload},
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.list().await
    }

    pub async fn create(&self, payload: ProductPayload) -> Result<Product, AppError> {
        let product_type = self.canonical_type(&payload.product_type).await?;
        self.product_repo
            .create(
                &payload.product_name,
                &product_type,
                &payload.product_unit,
                payload.validity_days,
            )
            .await
    }

    pub async fn update(&self, product_id: i32, payload: ProductPayload) -> Result<Product, AppError> {
        let product_type = self.canonical_type(&payload.product_type).await?;
        self.product_repo
            .update(
                product_id,
                &payload.product_name,
                &product_type,
                &payload.product_unit,
                payload.validity_days,
            )
            .await?
            .ok_or_else(|| AppError::not_found("produto não encontrado"))
    }

    pub async fn delete(&self, product_id: i32) -> Result<(), AppError> {
        match self.product_repo.delete(product_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::not_found("produto não encontrado")),
            Err(AppError::DatabaseError(sqlx::Error::Database(db_err)))
                if db_err.is_foreign_key_violation() =>
            {
                Err(AppError::conflict(
                    "o produto está em uso por estoque, compras ou pedidos",
                ))
            }
            Err(err) => Err(err),
        }
    }

    // ---
    // Tipos de produto
    // ---

    pub async fn list_types(&self) -> Result<Vec<ProductType>, AppError> {
        self.product_repo.list_types().await
    }

    pub async fn create_type(&self, payload: ProductTypePayload) -> Result<ProductType, AppError> {
        self.product_repo.create_type(payload.product_type.trim()).await
    }

    pub async fn delete_type(&self, product_type_id: i32) -> Result<(), AppError> {
        if !self.product_repo.delete_type(product_type_id).await? {
            return Err(AppError::not_found("tipo de produto não encontrado"));
        }
        Ok(())
    }

    // Todo produto referencia um tipo cadastrado, na grafia canônica.
    async fn canonical_type(&self, product_type: &str) -> Result<String, AppError> {
        self.product_repo
            .canonical_type(product_type.trim())
            .await?
            .ok_or_else(|| {
                AppError::invalid(format!(
                    "tipo de produto '{}' não cadastrado",
                    product_type.trim()
                ))
            })
    }
}
