// src/db/inventory_repo.rs
//
// As duas tabelas de estoque compartilham o mesmo formato lógico; cada
// consulta apelida a coluna de quantidade para "stored_quantity" e o
// mapeamento reconstrói a variante certa de StoredQuantity.

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, Row, postgres::PgRow};

use crate::{
    common::error::AppError,
    models::inventory::{InventoryItem, InventoryKind, StoredQuantity},
};

// Detalhe de estoque com os campos de exibição já juntados.
#[derive(Debug, Clone)]
pub struct InventoryItemDetail {
    pub item: InventoryItem,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub product_unit: Option<String>,
    pub product_validity_days: Option<i32>,
    pub seller_email: Option<String>,
    pub seller_first_name: Option<String>,
    pub seller_last_name: Option<String>,
    pub seller_status: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_email: Option<String>,
    pub supplier_is_active: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct InventoryFilter {
    pub seller_id: Option<i32>,
    pub product_id: Option<i32>,
    pub product_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

fn map_item(kind: InventoryKind, row: &PgRow) -> Result<InventoryItem, sqlx::Error> {
    Ok(InventoryItem {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        seller_id: row.try_get("seller_id")?,
        supplier_id: row.try_get("supplier_id")?,
        origin_type: row.try_get("origin_type")?,
        origin: row.try_get("origin")?,
        entry_date: row.try_get("entry_date")?,
        created_by_admin_user_id: row.try_get("created_by_admin_user_id")?,
        stock: StoredQuantity::new(kind, row.try_get("stored_quantity")?),
        reserved_quantity: row.try_get("reserved_quantity")?,
        price_per_unit: row.try_get("price_per_unit")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_detail(kind: InventoryKind, row: &PgRow) -> Result<InventoryItemDetail, sqlx::Error> {
    Ok(InventoryItemDetail {
        item: map_item(kind, row)?,
        product_name: row.try_get("product_name")?,
        product_type: row.try_get("product_type")?,
        product_unit: row.try_get("product_unit")?,
        product_validity_days: row.try_get("product_validity_days")?,
        seller_email: row.try_get("seller_email")?,
        seller_first_name: row.try_get("seller_first_name")?,
        seller_last_name: row.try_get("seller_last_name")?,
        seller_status: row.try_get("seller_status")?,
        supplier_name: row.try_get("supplier_name")?,
        supplier_email: row.try_get("supplier_email")?,
        supplier_is_active: row.try_get("supplier_is_active")?,
    })
}

fn base_columns(kind: InventoryKind) -> String {
    format!(
        "i.id, i.product_id, i.seller_id, i.supplier_id, i.origin_type, i.origin, \
         i.entry_date, i.created_by_admin_user_id, i.{} AS stored_quantity, \
         i.reserved_quantity, i.price_per_unit, i.updated_at",
        kind.quantity_column()
    )
}

fn detail_columns(kind: InventoryKind) -> String {
    format!(
        "{}, p.product_name, p.product_type, p.product_unit, \
         p.validity_days AS product_validity_days, \
         u.email AS seller_email, u.first_name AS seller_first_name, \
         u.last_name AS seller_last_name, u.seller_status, \
         s.supplier_name, s.email AS supplier_email, s.is_active AS supplier_is_active",
        base_columns(kind)
    )
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM {} i WHERE i.id = $1",
            base_columns(kind),
            kind.table()
        );
        let row = sqlx::query(&sql).bind(item_id).fetch_optional(executor).await?;
        row.map(|row| map_item(kind, &row)).transpose().map_err(Into::into)
    }

    /// Mesmo que `get`, mas trava a linha dentro da transação corrente.
    /// Toda releitura que antecede uma mutação de reserva passa por aqui.
    pub async fn get_for_update<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM {} i WHERE i.id = $1 FOR UPDATE",
            base_columns(kind),
            kind.table()
        );
        let row = sqlx::query(&sql).bind(item_id).fetch_optional(executor).await?;
        row.map(|row| map_item(kind, &row)).transpose().map_err(Into::into)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        product_id: i32,
        seller_id: Option<i32>,
        supplier_id: Option<i32>,
        origin_type: &str,
        origin: Option<&str>,
        quantity: i32,
        price_per_unit: Decimal,
        created_by_admin_user_id: i32,
    ) -> Result<InventoryItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO {} (product_id, seller_id, supplier_id, origin_type, origin, \
             {}, price_per_unit, created_by_admin_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            kind.table(),
            kind.quantity_column(),
            base_columns(kind).replace("i.", "")
        );
        let row = sqlx::query(&sql)
            .bind(product_id)
            .bind(seller_id)
            .bind(supplier_id)
            .bind(origin_type)
            .bind(origin)
            .bind(quantity)
            .bind(price_per_unit)
            .bind(created_by_admin_user_id)
            .fetch_one(executor)
            .await?;
        Ok(map_item(kind, &row)?)
    }

    /// Sobrescreve a quantidade armazenada. `updated_at` avança, o que
    /// reinicia o relógio de validade do item.
    pub async fn set_quantity<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
        quantity: i32,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} i SET {} = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            kind.table(),
            kind.quantity_column(),
            base_columns(kind).replace("i.", "")
        );
        let row = sqlx::query(&sql)
            .bind(item_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await?;
        row.map(|row| map_item(kind, &row)).transpose().map_err(Into::into)
    }

    /// Soma quantidade (merge de procurement empurrado mais de uma vez
    /// para o mesmo par fornecedor+produto).
    pub async fn add_quantity<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
        delta: i32,
        created_by_admin_user_id: i32,
        origin: Option<&str>,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} i SET {col} = {col} + $2, origin = COALESCE($3, origin), \
             created_by_admin_user_id = $4, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            kind.table(),
            base_columns(kind).replace("i.", ""),
            col = kind.quantity_column(),
        );
        let row = sqlx::query(&sql)
            .bind(item_id)
            .bind(delta)
            .bind(origin)
            .bind(created_by_admin_user_id)
            .fetch_optional(executor)
            .await?;
        row.map(|row| map_item(kind, &row)).transpose().map_err(Into::into)
    }

    /// Incrementa a reserva (criação de pedido). Deve rodar dentro da
    /// mesma transação que validou a disponibilidade.
    pub async fn add_reserved<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
        qty: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET reserved_quantity = reserved_quantity + $2 WHERE id = $1",
            kind.table()
        );
        sqlx::query(&sql).bind(item_id).bind(qty).execute(executor).await?;
        Ok(())
    }

    /// Libera a reserva e, opcionalmente, consome o estoque (entrega).
    /// Ambos os lados têm piso em zero.
    pub async fn release_reservation<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        item_id: i32,
        qty: i32,
        consume_stock: bool,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if consume_stock {
            format!(
                "UPDATE {} SET reserved_quantity = GREATEST(0, reserved_quantity - $2), \
                 {col} = GREATEST(0, {col} - $2) WHERE id = $1",
                kind.table(),
                col = kind.quantity_column(),
            )
        } else {
            format!(
                "UPDATE {} SET reserved_quantity = GREATEST(0, reserved_quantity - $2) WHERE id = $1",
                kind.table()
            )
        };
        sqlx::query(&sql).bind(item_id).bind(qty).execute(executor).await?;
        Ok(())
    }

    pub async fn delete(&self, kind: InventoryKind, item_id: i32) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(item_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Linha de procurement existente para o par fornecedor+produto, se
    /// houver (destino do merge do push-to-inventory).
    pub async fn find_procurement_item<'e, E>(
        &self,
        executor: E,
        kind: InventoryKind,
        product_id: i32,
        supplier_id: i32,
    ) -> Result<Option<InventoryItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM {} i \
             WHERE i.origin_type = 'procurement' AND i.product_id = $1 AND i.supplier_id = $2 \
             FOR UPDATE",
            base_columns(kind),
            kind.table()
        );
        let row = sqlx::query(&sql)
            .bind(product_id)
            .bind(supplier_id)
            .fetch_optional(executor)
            .await?;
        row.map(|row| map_item(kind, &row)).transpose().map_err(Into::into)
    }

    /// Listagem com os joins de exibição. Os filtros espelham a tela de
    /// estoque: vendedor, produto, tipo e status do dono.
    pub async fn list_details(
        &self,
        kind: InventoryKind,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryItemDetail>, AppError> {
        let mut sql = format!(
            "SELECT {} FROM {} i \
             JOIN products p ON p.id = i.product_id \
             LEFT JOIN users u ON u.id = i.seller_id \
             LEFT JOIN suppliers s ON s.supplier_id = i.supplier_id \
             WHERE TRUE",
            detail_columns(kind),
            kind.table()
        );

        // Os binds são posicionais; monta o WHERE na ordem dos parâmetros.
        let mut arg = 0;
        if filter.seller_id.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND i.seller_id = ${arg}"));
        }
        if filter.product_id.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND i.product_id = ${arg}"));
        }
        if filter.product_type.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND p.product_type = ${arg}"));
        }
        if let Some(status) = filter.status.as_deref() {
            if status == "active" || status == "inactive" {
                arg += 1;
                sql.push_str(&format!(
                    " AND i.origin_type = 'procurement' AND s.is_active = (${arg} = 'active')"
                ));
            } else {
                arg += 1;
                sql.push_str(&format!(
                    " AND i.origin_type = 'seller_direct' AND u.seller_status = ${arg}"
                ));
            }
        }
        sql.push_str(" ORDER BY i.entry_date DESC, i.id DESC");

        let mut query = sqlx::query(&sql);
        if let Some(seller_id) = filter.seller_id {
            query = query.bind(seller_id);
        }
        if let Some(product_id) = filter.product_id {
            query = query.bind(product_id);
        }
        if let Some(product_type) = filter.product_type.as_deref() {
            query = query.bind(product_type);
        }
        if let Some(status) = filter.status.as_deref() {
            query = query.bind(status);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| map_detail(kind, row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}
