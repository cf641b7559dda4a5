// src/db/procurement_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::procurement::{ProcurementOrder, ProcurementOrderReview, ProcurementOrderReviewImage},
};

#[derive(Clone)]
pub struct ProcurementRepository {
    pool: PgPool,
}

impl ProcurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        procurement_id: i32,
    ) -> Result<Option<ProcurementOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, ProcurementOrder>(
            "SELECT * FROM procurement_orders WHERE procurement_id = $1",
        )
        .bind(procurement_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    /// Trava a linha durante o push-to-inventory, para que duas chamadas
    /// concorrentes não dupliquem a carga.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        procurement_id: i32,
    ) -> Result<Option<ProcurementOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, ProcurementOrder>(
            "SELECT * FROM procurement_orders WHERE procurement_id = $1 FOR UPDATE",
        )
        .bind(procurement_id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn list(&self, supplier_id: Option<i32>) -> Result<Vec<ProcurementOrder>, AppError> {
        let orders = match supplier_id {
            Some(supplier_id) => {
                sqlx::query_as::<_, ProcurementOrder>(
                    "SELECT * FROM procurement_orders WHERE supplier_id = $1 \
                     ORDER BY procurement_date DESC, procurement_id DESC",
                )
                .bind(supplier_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProcurementOrder>(
                    "SELECT * FROM procurement_orders \
                     ORDER BY procurement_date DESC, procurement_id DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(orders)
    }

    pub async fn create(
        &self,
        supplier_id: i32,
        product_id: i32,
        quantity: i32,
        price_per_unit: Decimal,
        status: &str,
        created_by_admin_user_id: i32,
    ) -> Result<ProcurementOrder, AppError> {
        let order = sqlx::query_as::<_, ProcurementOrder>(
            "INSERT INTO procurement_orders (supplier_id, product_id, quantity, \
             price_per_unit, status, created_by_admin_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(supplier_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price_per_unit)
        .bind(status)
        .bind(created_by_admin_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn update_status(
        &self,
        procurement_id: i32,
        status: &str,
    ) -> Result<Option<ProcurementOrder>, AppError> {
        let order = sqlx::query_as::<_, ProcurementOrder>(
            "UPDATE procurement_orders SET status = $2, updated_at = now() \
             WHERE procurement_id = $1 RETURNING *",
        )
        .bind(procurement_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    pub async fn mark_pushed<'e, E>(
        &self,
        executor: E,
        procurement_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE procurement_orders SET pushed_to_inventory = TRUE, updated_at = now() \
             WHERE procurement_id = $1",
        )
        .bind(procurement_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, procurement_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM procurement_orders WHERE procurement_id = $1")
            .bind(procurement_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Avaliações (uma por compra; o serviço acumula texto e fotos no reenvio)
    // ---

    pub async fn find_review(
        &self,
        procurement_id: i32,
    ) -> Result<Option<ProcurementOrderReview>, AppError> {
        let review = sqlx::query_as::<_, ProcurementOrderReview>(
            "SELECT * FROM procurement_order_reviews WHERE procurement_id = $1",
        )
        .bind(procurement_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    pub async fn upsert_review<'e, E>(
        &self,
        executor: E,
        procurement_id: i32,
        supplier_id: i32,
        product_id: i32,
        rating: i32,
        review_text: Option<&str>,
        reviewed_by_user_id: i32,
    ) -> Result<ProcurementOrderReview, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let review = sqlx::query_as::<_, ProcurementOrderReview>(
            "INSERT INTO procurement_order_reviews (procurement_id, supplier_id, product_id, \
             rating, review_text, reviewed_by_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (procurement_id) DO UPDATE SET \
             rating = EXCLUDED.rating, review_text = EXCLUDED.review_text, \
             reviewed_by_user_id = EXCLUDED.reviewed_by_user_id \
             RETURNING *",
        )
        .bind(procurement_id)
        .bind(supplier_id)
        .bind(product_id)
        .bind(rating)
        .bind(review_text)
        .bind(reviewed_by_user_id)
        .fetch_one(executor)
        .await?;
        Ok(review)
    }

    pub async fn reviews_of_supplier(
        &self,
        supplier_id: i32,
    ) -> Result<Vec<ProcurementOrderReview>, AppError> {
        let reviews = sqlx::query_as::<_, ProcurementOrderReview>(
            "SELECT * FROM procurement_order_reviews WHERE supplier_id = $1 \
             ORDER BY created_at DESC, review_id DESC",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn add_review_image<'e, E>(
        &self,
        executor: E,
        review_id: i32,
        file_path: &str,
    ) -> Result<ProcurementOrderReviewImage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let image = sqlx::query_as::<_, ProcurementOrderReviewImage>(
            "INSERT INTO procurement_order_review_images (review_id, file_path) \
             VALUES ($1, $2) RETURNING *",
        )
        .bind(review_id)
        .bind(file_path)
        .fetch_one(executor)
        .await?;
        Ok(image)
    }

    pub async fn images_of_review(
        &self,
        review_id: i32,
    ) -> Result<Vec<ProcurementOrderReviewImage>, AppError> {
        let images = sqlx::query_as::<_, ProcurementOrderReviewImage>(
            "SELECT * FROM procurement_order_review_images WHERE review_id = $1 \
             ORDER BY image_id ASC",
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(images)
    }
}
