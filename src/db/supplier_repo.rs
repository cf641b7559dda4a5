// src/db/supplier_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::supplier::{Supplier, SupplierProduct},
};

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(&self, executor: E, supplier_id: i32) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE supplier_id = $1")
                .bind(supplier_id)
                .fetch_optional(executor)
                .await?;
        Ok(supplier)
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY supplier_name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(suppliers)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        supplier_name: &str,
        email: Option<&str>,
        address_line1: Option<&str>,
        address_line2: Option<&str>,
        address_line3: Option<&str>,
        phone_number: Option<&str>,
        is_active: bool,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            "INSERT INTO suppliers (supplier_name, email, address_line1, address_line2, \
             address_line3, phone_number, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(supplier_name)
        .bind(email)
        .bind(address_line1)
        .bind(address_line2)
        .bind(address_line3)
        .bind(phone_number)
        .bind(is_active)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        supplier_id: i32,
        supplier_name: &str,
        email: Option<&str>,
        address_line1: Option<&str>,
        address_line2: Option<&str>,
        address_line3: Option<&str>,
        phone_number: Option<&str>,
        is_active: bool,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            "UPDATE suppliers SET supplier_name = $2, email = $3, address_line1 = $4, \
             address_line2 = $5, address_line3 = $6, phone_number = $7, is_active = $8, \
             updated_at = now() WHERE supplier_id = $1 RETURNING *",
        )
        .bind(supplier_id)
        .bind(supplier_name)
        .bind(email)
        .bind(address_line1)
        .bind(address_line2)
        .bind(address_line3)
        .bind(phone_number)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn delete(&self, supplier_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Vínculos fornecedor-produto
    // ---

    pub async fn links_of(&self, supplier_id: i32) -> Result<Vec<SupplierProduct>, AppError> {
        let links = sqlx::query_as::<_, SupplierProduct>(
            "SELECT * FROM supplier_products WHERE supplier_id = $1 ORDER BY product_id ASC",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    pub async fn find_link<'e, E>(
        &self,
        executor: E,
        supplier_id: i32,
        product_id: i32,
    ) -> Result<Option<SupplierProduct>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let link = sqlx::query_as::<_, SupplierProduct>(
            "SELECT * FROM supplier_products WHERE supplier_id = $1 AND product_id = $2",
        )
        .bind(supplier_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(link)
    }

    pub async fn replace_links(
        &self,
        conn: &mut sqlx::PgConnection,
        supplier_id: i32,
        links: &[(i32, String)],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM supplier_products WHERE supplier_id = $1")
            .bind(supplier_id)
            .execute(&mut *conn)
            .await?;
        for (product_id, supplier_type) in links {
            sqlx::query(
                "INSERT INTO supplier_products (supplier_id, product_id, supplier_type) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (supplier_id, product_id) DO UPDATE SET supplier_type = EXCLUDED.supplier_type",
            )
            .bind(supplier_id)
            .bind(product_id)
            .bind(supplier_type)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
