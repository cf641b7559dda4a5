// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, Row};

use crate::{
    common::error::AppError,
    models::order::{Order, OrderGroup, OrderItem},
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Unicidade dos números (checada dentro da transação de criação)
    // ---

    pub async fn group_number_exists<'e, E>(
        &self,
        executor: E,
        group_number: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM order_groups WHERE group_number = $1) AS present",
        )
        .bind(group_number)
        .fetch_one(executor)
        .await?;
        Ok(row.try_get::<bool, _>("present")?)
    }

    pub async fn order_number_exists<'e, E>(
        &self,
        executor: E,
        order_number: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE order_number = $1) AS present",
        )
        .bind(order_number)
        .fetch_one(executor)
        .await?;
        Ok(row.try_get::<bool, _>("present")?)
    }

    // ---
    // Inserções (sempre dentro da transação de criação do grupo)
    // ---

    pub async fn insert_group<'e, E>(
        &self,
        executor: E,
        group_number: &str,
        buyer_id: i32,
        total_amount: Decimal,
        currency: &str,
    ) -> Result<OrderGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, OrderGroup>(
            "INSERT INTO order_groups (group_number, buyer_id, total_amount, currency) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(group_number)
        .bind(buyer_id)
        .bind(total_amount)
        .bind(currency)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        order_number: &str,
        order_group_id: i32,
        buyer_id: i32,
        seller_id: Option<i32>,
        supplier_id: Option<i32>,
        status: &str,
        total_amount: Decimal,
        currency: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (order_number, order_group_id, buyer_id, seller_id, \
             supplier_id, status, total_amount, currency) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(order_number)
        .bind(order_group_id)
        .bind(buyer_id)
        .bind(seller_id)
        .bind(supplier_id)
        .bind(status)
        .bind(total_amount)
        .bind(currency)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: i32,
        sku: &str,
        name: &str,
        product_id: Option<i32>,
        inventory_kind: Option<&str>,
        source_inventory_item_id: Option<i32>,
        qty: i32,
        unit_price: Decimal,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items (order_id, sku, name, product_id, inventory_kind, \
             source_inventory_item_id, qty, unit_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(order_id)
        .bind(sku)
        .bind(name)
        .bind(product_id)
        .bind(inventory_kind)
        .bind(source_inventory_item_id)
        .bind(qty)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    // ---
    // Leitura
    // ---

    pub async fn get_order<'e, E>(&self, executor: E, order_id: i32) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Trava a linha do pedido durante a transação de mudança de status,
    /// para que duas escritas concorrentes não apliquem o efeito de
    /// estoque duas vezes.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn items_of_order<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        order_id: i32,
        status: &str,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    // ---
    // Listagens com escopo (quem vê o quê é decidido no serviço; aqui só
    // executamos o recorte já resolvido)
    // ---

    pub async fn list_all_orders(&self) -> Result<Vec<Order>, AppError> {
        let orders =
            sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(orders)
    }

    pub async fn list_orders_for_buyers(&self, buyer_ids: &[i32]) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE buyer_id = ANY($1) ORDER BY created_at DESC, id DESC",
        )
        .bind(buyer_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn list_orders_for_seller(&self, seller_id: i32) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE seller_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn get_group(&self, order_group_id: i32) -> Result<Option<OrderGroup>, AppError> {
        let group = sqlx::query_as::<_, OrderGroup>("SELECT * FROM order_groups WHERE id = $1")
            .bind(order_group_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    pub async fn list_all_groups(&self) -> Result<Vec<OrderGroup>, AppError> {
        let groups = sqlx::query_as::<_, OrderGroup>(
            "SELECT * FROM order_groups ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    pub async fn list_groups_for_buyers(
        &self,
        buyer_ids: &[i32],
    ) -> Result<Vec<OrderGroup>, AppError> {
        let groups = sqlx::query_as::<_, OrderGroup>(
            "SELECT * FROM order_groups WHERE buyer_id = ANY($1) \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(buyer_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    pub async fn orders_of_group(&self, order_group_id: i32) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE order_group_id = $1 ORDER BY id ASC",
        )
        .bind(order_group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
