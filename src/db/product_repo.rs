// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::product::{Product, ProductType},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(&self, executor: E, product_id: i32) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY product_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    pub async fn create(
        &self,
        product_name: &str,
        product_type: &str,
        product_unit: &str,
        validity_days: Option<i32>,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (product_name, product_type, product_unit, validity_days) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(product_name)
        .bind(product_type)
        .bind(product_unit)
        .bind(validity_days)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn update(
        &self,
        product_id: i32,
        product_name: &str,
        product_type: &str,
        product_unit: &str,
        validity_days: Option<i32>,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET product_name = $2, product_type = $3, product_unit = $4, \
             validity_days = $5 WHERE id = $1 RETURNING *",
        )
        .bind(product_id)
        .bind(product_name)
        .bind(product_type)
        .bind(product_unit)
        .bind(validity_days)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn delete(&self, product_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Tipos de produto (catálogo controlado)
    // ---

    pub async fn list_types(&self) -> Result<Vec<ProductType>, AppError> {
        let types =
            sqlx::query_as::<_, ProductType>("SELECT * FROM product_types ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(types)
    }

    pub async fn create_type(&self, product_type: &str) -> Result<ProductType, AppError> {
        let result = sqlx::query_as::<_, ProductType>(
            "INSERT INTO product_types (product_type) VALUES ($1) RETURNING *",
        )
        .bind(product_type)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::conflict("esse tipo de produto já existe"))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_type(&self, product_type_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM product_types WHERE id = $1")
            .bind(product_type_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve a grafia canônica de um tipo de produto (match exato,
    /// senão case-insensitive). `None` = tipo não cadastrado.
    pub async fn canonical_type(&self, product_type: &str) -> Result<Option<String>, AppError> {
        let exact = sqlx::query_as::<_, ProductType>(
            "SELECT * FROM product_types WHERE product_type = $1",
        )
        .bind(product_type)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = exact {
            return Ok(Some(row.product_type));
        }

        let relaxed = sqlx::query_as::<_, ProductType>(
            "SELECT * FROM product_types WHERE lower(product_type) = lower($1) ORDER BY id ASC LIMIT 1",
        )
        .bind(product_type)
        .fetch_optional(&self.pool)
        .await?;
        Ok(relaxed.map(|row| row.product_type))
    }
}
