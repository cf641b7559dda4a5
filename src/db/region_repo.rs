// src/db/region_repo.rs

use sqlx::{Executor, PgPool, Postgres, Row};

use crate::{
    common::error::AppError,
    models::region::{Region, RegionDefault},
};

#[derive(Clone)]
pub struct RegionRepository {
    pool: PgPool,
}

impl RegionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(&self, executor: E, region_id: i32) -> Result<Option<Region>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let region =
            sqlx::query_as::<_, Region>("SELECT * FROM regions WHERE region_id = $1")
                .bind(region_id)
                .fetch_optional(executor)
                .await?;
        Ok(region)
    }

    pub async fn list_all(&self) -> Result<Vec<Region>, AppError> {
        let regions = sqlx::query_as::<_, Region>(
            "SELECT * FROM regions ORDER BY region_type ASC, region_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(regions)
    }

    pub async fn list_distribution(&self) -> Result<Vec<Region>, AppError> {
        let regions = sqlx::query_as::<_, Region>(
            "SELECT * FROM regions WHERE region_type = 'distribution' ORDER BY region_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(regions)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        region_name: &str,
        region_description: Option<&str>,
        region_type: &str,
        distribution_level: Option<&str>,
        parent_region_id: Option<i32>,
    ) -> Result<Region, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query_as::<_, Region>(
            "INSERT INTO regions (region_name, region_description, region_type, \
             distribution_level, parent_region_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(region_name)
        .bind(region_description)
        .bind(region_type)
        .bind(distribution_level)
        .bind(parent_region_id)
        .fetch_one(executor)
        .await;

        match result {
            Ok(region) => Ok(region),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::conflict("já existe uma região com esse nome e tipo"),
            ),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update(
        &self,
        region_id: i32,
        region_name: &str,
        region_description: Option<&str>,
        distribution_level: Option<&str>,
        parent_region_id: Option<i32>,
    ) -> Result<Option<Region>, AppError> {
        let result = sqlx::query_as::<_, Region>(
            "UPDATE regions SET region_name = $2, region_description = $3, \
             distribution_level = $4, parent_region_id = $5 \
             WHERE region_id = $1 RETURNING *",
        )
        .bind(region_id)
        .bind(region_name)
        .bind(region_description)
        .bind(distribution_level)
        .bind(parent_region_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(region) => Ok(region),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                AppError::conflict("já existe uma região com esse nome e tipo"),
            ),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn has_children(&self, region_id: i32) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM regions WHERE parent_region_id = $1) AS present",
        )
        .bind(region_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<bool, _>("present")?)
    }

    pub async fn delete(&self, region_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM regions WHERE region_id = $1")
            .bind(region_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn reparent<'e, E>(
        &self,
        executor: E,
        region_id: i32,
        new_parent_region_id: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE regions SET parent_region_id = $2 WHERE region_id = $1")
            .bind(region_id)
            .bind(new_parent_region_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // RegionDefault (um por região, upsert)
    // ---

    pub async fn get_default(&self, region_id: i32) -> Result<Option<RegionDefault>, AppError> {
        let default = sqlx::query_as::<_, RegionDefault>(
            "SELECT * FROM region_defaults WHERE region_id = $1",
        )
        .bind(region_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(default)
    }

    pub async fn list_defaults(&self) -> Result<Vec<RegionDefault>, AppError> {
        let defaults =
            sqlx::query_as::<_, RegionDefault>("SELECT * FROM region_defaults ORDER BY region_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(defaults)
    }

    pub async fn upsert_default(
        &self,
        region_id: i32,
        default_admin_user_id: Option<i32>,
        default_ambassador_user_id: Option<i32>,
    ) -> Result<RegionDefault, AppError> {
        let default = sqlx::query_as::<_, RegionDefault>(
            "INSERT INTO region_defaults (region_id, default_admin_user_id, default_ambassador_user_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (region_id) DO UPDATE SET \
             default_admin_user_id = EXCLUDED.default_admin_user_id, \
             default_ambassador_user_id = EXCLUDED.default_ambassador_user_id \
             RETURNING *",
        )
        .bind(region_id)
        .bind(default_admin_user_id)
        .bind(default_ambassador_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(default)
    }
}
