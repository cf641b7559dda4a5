// src/services/order_service.rs
//
// Criação de pedidos: um checkout vira um grupo de pedidos (um pedido por
// origem), com validação linha a linha, reserva de estoque e gravação em
// uma única transação. Qualquer linha inválida derruba o checkout inteiro.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{InventoryRepository, OrderRepository, ProductRepository, SupplierRepository, UserRepository},
    models::{
        auth::{ActorContext, Role, SellerStatus},
        inventory::{InventoryItem, InventoryKind},
        order::{
            CreateOrderItemPayload, CreateOrderPayload, InventoryEffect, Order, OrderGroup,
            OrderGroupResponse, OrderItemResponse, OrderResponse, OrderStatus,
            UpdateOrderStatusPayload, can_transition, transition_effect,
        },
    },
    services::scope_service::{GroupScope, ScopeService},
};

const DEFAULT_CURRENCY: &str = "BRL";
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Origem de um pedido: exatamente um seller ou um supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSource {
    Seller(i32),
    Supplier(i32),
}

impl OrderSource {
    pub fn seller_id(&self) -> Option<i32> {
        match self {
            OrderSource::Seller(id) => Some(*id),
            OrderSource::Supplier(_) => None,
        }
    }

    pub fn supplier_id(&self) -> Option<i32> {
        match self {
            OrderSource::Seller(_) => None,
            OrderSource::Supplier(id) => Some(*id),
        }
    }
}

/// Resolve a origem de uma linha: o override da linha vence o padrão do
/// payload, e exatamente um dos dois lados precisa estar presente.
pub fn resolve_source(
    default_seller: Option<i32>,
    default_supplier: Option<i32>,
    line: &CreateOrderItemPayload,
) -> Result<OrderSource, AppError> {
    let seller = line.seller_id.or(default_seller);
    let supplier = line.supplier_id.or(default_supplier);

    match (seller, supplier) {
        (Some(seller_id), None) => Ok(OrderSource::Seller(seller_id)),
        (None, Some(supplier_id)) => Ok(OrderSource::Supplier(supplier_id)),
        (Some(_), Some(_)) => Err(AppError::invalid(
            "cada item deve ter seller_id ou supplier_id, nunca os dois",
        )),
        (None, None) => Err(AppError::invalid(
            "cada item precisa de um seller_id ou supplier_id",
        )),
    }
}

// Linha já validada contra o estoque, pronta para gravação.
struct ValidatedLine {
    source: OrderSource,
    sku: String,
    name: String,
    product_id: i32,
    kind: InventoryKind,
    inventory_item_id: i32,
    qty: i32,
    unit_price: Decimal,
}

impl ValidatedLine {
    fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.qty)
    }
}

/// Agrupa as linhas por origem preservando a ordem de primeira aparição.
fn group_by_source(lines: Vec<ValidatedLine>) -> Vec<(OrderSource, Vec<ValidatedLine>)> {
    let mut order: Vec<OrderSource> = Vec::new();
    let mut grouped: HashMap<OrderSource, Vec<ValidatedLine>> = HashMap::new();
    for line in lines {
        if !grouped.contains_key(&line.source) {
            order.push(line.source);
        }
        grouped.entry(line.source).or_default().push(line);
    }
    order
        .into_iter()
        .map(|source| {
            let lines = grouped.remove(&source).unwrap_or_default();
            (source, lines)
        })
        .collect()
}

fn timestamp_stamp() -> String {
    let now = Utc::now();
    format!("{}{:06}", now.format("%Y%m%d%H%M%S"), now.timestamp_subsec_micros())
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    inventory_repo: InventoryRepository,
    product_repo: ProductRepository,
    user_repo: UserRepository,
    supplier_repo: SupplierRepository,
    scope_service: ScopeService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        inventory_repo: InventoryRepository,
        product_repo: ProductRepository,
        user_repo: UserRepository,
        supplier_repo: SupplierRepository,
        scope_service: ScopeService,
        pool: PgPool,
    ) -> Self {
        Self {
            order_repo,
            inventory_repo,
            product_repo,
            user_repo,
            supplier_repo,
            scope_service,
            pool,
        }
    }

    /// Checkout completo: valida cada linha contra o estoque (com a linha
    /// travada), agrupa por origem, reserva e grava tudo ou nada.
    pub async fn create_order_group(
        &self,
        actor: &ActorContext,
        payload: CreateOrderPayload,
    ) -> Result<OrderGroupResponse, AppError> {
        let buyer_id = actor.user_id;
        let currency = payload
            .currency
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY)
            .to_uppercase();

        let mut tx = self.pool.begin().await?;

        // Valida e trava cada linha. A releitura do estoque acontece já
        // com FOR UPDATE, então a disponibilidade checada aqui continua
        // verdadeira até o commit.
        let mut validated = Vec::with_capacity(payload.items.len());
        for (index, line) in payload.items.iter().enumerate() {
            let source = resolve_source(payload.seller_id, payload.supplier_id, line)
                .map_err(|e| prefix_line(index, e))?;
            let validated_line = self
                .validate_line(&mut tx, source, line)
                .await
                .map_err(|e| prefix_line(index, e))?;
            validated.push(validated_line);
        }

        let grouped = group_by_source(validated);
        let group_total: Decimal = grouped
            .iter()
            .flat_map(|(_, lines)| lines.iter())
            .map(ValidatedLine::line_total)
            .sum();

        let group_number = self.unique_group_number(&mut tx).await?;
        let group = self
            .order_repo
            .insert_group(&mut *tx, &group_number, buyer_id, group_total, &currency)
            .await?;

        let mut orders = Vec::with_capacity(grouped.len());
        for (index, (source, lines)) in grouped.into_iter().enumerate() {
            let order_total: Decimal = lines.iter().map(ValidatedLine::line_total).sum();
            let order_number = self.unique_order_number(&mut tx, index + 1).await?;

            let order = self
                .order_repo
                .insert_order(
                    &mut *tx,
                    &order_number,
                    group.id,
                    buyer_id,
                    source.seller_id(),
                    source.supplier_id(),
                    OrderStatus::Created.as_str(),
                    order_total,
                    &currency,
                )
                .await?;

            let mut items = Vec::with_capacity(lines.len());
            for line in &lines {
                let item = self
                    .order_repo
                    .insert_item(
                        &mut *tx,
                        order.id,
                        &line.sku,
                        &line.name,
                        Some(line.product_id),
                        Some(line.kind.as_str()),
                        Some(line.inventory_item_id),
                        line.qty,
                        line.unit_price,
                    )
                    .await?;
                // Reserva na mesma transação que validou.
                self.inventory_repo
                    .add_reserved(&mut *tx, line.kind, line.inventory_item_id, line.qty)
                    .await?;
                items.push(item);
            }
            orders.push((order, items));
        }

        tx.commit().await?;

        tracing::info!(
            group_number = %group.group_number,
            buyer_id,
            orders = orders.len(),
            "grupo de pedidos criado"
        );
        self.build_group_response(group, orders).await
    }

    /// Escrita de status com o efeito de estoque correspondente, tudo em
    /// uma transação com o pedido travado.
    pub async fn update_status(
        &self,
        actor: &ActorContext,
        order_id: i32,
        payload: UpdateOrderStatusPayload,
    ) -> Result<OrderResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("pedido não encontrado"))?;

        // Sellers só mexem nos próprios pedidos; admin e support_ops em todos.
        if !actor.is_admin_like() && !actor.has_role(Role::SupportOps) {
            if order.seller_id != Some(actor.user_id) {
                return Err(AppError::forbidden(
                    "você só pode atualizar pedidos da sua loja",
                ));
            }
        }

        let current = order
            .status_kind()
            .ok_or_else(|| AppError::invalid("pedido com status desconhecido no banco"))?;
        let target = payload.status;

        if !can_transition(current, target) {
            return Err(AppError::conflict(format!(
                "pedido em estado terminal '{}' não aceita '{}'",
                current.as_str(),
                target.as_str()
            )));
        }

        match transition_effect(current, target) {
            InventoryEffect::None => {}
            InventoryEffect::ReleaseReservation => {
                self.apply_inventory_effect(&mut tx, order.id, false).await?;
            }
            InventoryEffect::ReleaseAndConsume => {
                self.apply_inventory_effect(&mut tx, order.id, true).await?;
            }
        }

        let updated = self
            .order_repo
            .update_status(&mut *tx, order.id, target.as_str())
            .await?;
        tx.commit().await?;

        tracing::info!(
            order_number = %updated.order_number,
            from = current.as_str(),
            to = target.as_str(),
            "status do pedido atualizado"
        );
        self.build_order_response(updated, None).await
    }

    pub async fn list_orders(&self, actor: &ActorContext) -> Result<Vec<OrderResponse>, AppError> {
        let orders = self.visible_orders(actor).await?;
        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            responses.push(self.build_order_response(order, None).await?);
        }
        Ok(responses)
    }

    pub async fn get_order(
        &self,
        actor: &ActorContext,
        order_id: i32,
    ) -> Result<OrderResponse, AppError> {
        let order = self
            .order_repo
            .get_order(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("pedido não encontrado"))?;
        self.check_order_visible(actor, &order).await?;
        self.build_order_response(order, None).await
    }

    pub async fn list_groups(
        &self,
        actor: &ActorContext,
    ) -> Result<Vec<OrderGroupResponse>, AppError> {
        let groups = if actor.is_admin_like() || actor.has_role(Role::SupportOps) {
            self.order_repo.list_all_groups().await?
        } else if actor.has_role(Role::Ambassador) {
            match self.scope_service.group_scope(actor).await? {
                GroupScope::All => self.order_repo.list_all_groups().await?,
                GroupScope::Restricted { buyer_ids, .. } => {
                    let ids: Vec<i32> = buyer_ids.into_iter().collect();
                    self.order_repo.list_groups_for_buyers(&ids).await?
                }
            }
        } else {
            self.order_repo.list_groups_for_buyers(&[actor.user_id]).await?
        };

        let mut responses = Vec::with_capacity(groups.len());
        for group in groups {
            let orders = self.order_repo.orders_of_group(group.id).await?;
            let mut with_items = Vec::with_capacity(orders.len());
            for order in orders {
                let items = self.order_repo.items_of_order(&self.pool, order.id).await?;
                with_items.push((order, items));
            }
            responses.push(self.build_group_response(group, with_items).await?);
        }
        Ok(responses)
    }

    pub async fn get_group(
        &self,
        actor: &ActorContext,
        order_group_id: i32,
    ) -> Result<OrderGroupResponse, AppError> {
        let group = self
            .order_repo
            .get_group(order_group_id)
            .await?
            .ok_or_else(|| AppError::not_found("grupo de pedidos não encontrado"))?;

        let orders = self.order_repo.orders_of_group(group.id).await?;
        self.check_group_visible(actor, &group, &orders).await?;

        let mut with_items = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.order_repo.items_of_order(&self.pool, order.id).await?;
            with_items.push((order, items));
        }
        self.build_group_response(group, with_items).await
    }

    // ---
    // Validação de linha
    // ---

    async fn validate_line(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        source: OrderSource,
        line: &CreateOrderItemPayload,
    ) -> Result<ValidatedLine, AppError> {
        if line.qty < 1 {
            return Err(AppError::invalid("qty deve ser um inteiro positivo"));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(AppError::invalid("unit_price não pode ser negativo"));
        }

        // A origem precisa estar apta a vender.
        match source {
            OrderSource::Seller(seller_id) => {
                let seller = self
                    .user_repo
                    .find_with_roles(seller_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("seller não encontrado"))?;
                if !seller.has_role(Role::Seller) {
                    return Err(AppError::invalid("o usuário informado não tem papel seller"));
                }
                if seller.seller_status() != Some(SellerStatus::Valid) {
                    return Err(AppError::invalid("o seller ainda não foi validado"));
                }
            }
            OrderSource::Supplier(supplier_id) => {
                let supplier = self
                    .supplier_repo
                    .get(&mut **tx, supplier_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("fornecedor não encontrado"))?;
                if !supplier.is_active {
                    return Err(AppError::invalid("o fornecedor está inativo"));
                }
            }
        }

        // Releitura do estoque com a linha travada.
        let item: InventoryItem = self
            .inventory_repo
            .get_for_update(&mut **tx, line.inventory_kind, line.source_inventory_item_id)
            .await?
            .ok_or_else(|| AppError::not_found("registro de estoque não encontrado"))?;

        if item.product_id != line.product_id {
            return Err(AppError::invalid(
                "o registro de estoque não corresponde ao produto informado",
            ));
        }
        match source {
            OrderSource::Seller(seller_id) if item.seller_id != Some(seller_id) => {
                return Err(AppError::invalid("o estoque não pertence ao seller informado"));
            }
            OrderSource::Supplier(supplier_id) if item.supplier_id != Some(supplier_id) => {
                return Err(AppError::invalid(
                    "o estoque não pertence ao fornecedor informado",
                ));
            }
            _ => {}
        }

        let product = self
            .product_repo
            .get(&mut **tx, item.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("produto não encontrado"))?;

        let now = Utc::now();
        if item.is_expired(&product, now) {
            return Err(AppError::conflict("o estoque deste item está expirado"));
        }
        let available = item.available_quantity(&product, now);
        if line.qty > available {
            return Err(AppError::conflict(format!(
                "quantidade indisponível: pedido {} x disponível {}",
                line.qty, available
            )));
        }

        Ok(ValidatedLine {
            source,
            sku: line.sku.clone(),
            name: line.name.clone(),
            product_id: line.product_id,
            kind: line.inventory_kind,
            inventory_item_id: line.source_inventory_item_id,
            qty: line.qty,
            // O preço é normalizado para 2 casas antes de qualquer soma.
            unit_price: line.unit_price.round_dp(2),
        })
    }

    // ---
    // Números de grupo/pedido
    // ---

    async fn unique_group_number(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<String, AppError> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let candidate = format!("GRP-{}", timestamp_stamp());
            if !self.order_repo.group_number_exists(&mut **tx, &candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::conflict(
            "não foi possível gerar um número de grupo único; tente novamente",
        ))
    }

    async fn unique_order_number(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        index: usize,
    ) -> Result<String, AppError> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let candidate = format!("ORD-{}-{index}", timestamp_stamp());
            if !self.order_repo.order_number_exists(&mut **tx, &candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::conflict(
            "não foi possível gerar um número de pedido único; tente novamente",
        ))
    }

    // ---
    // Efeitos de estoque
    // ---

    async fn apply_inventory_effect(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: i32,
        consume_stock: bool,
    ) -> Result<(), AppError> {
        let items = self.order_repo.items_of_order(&mut **tx, order_id).await?;
        for item in items {
            let (Some(kind_name), Some(inventory_item_id)) =
                (item.inventory_kind.as_deref(), item.source_inventory_item_id)
            else {
                continue;
            };
            let Some(kind) = InventoryKind::parse(kind_name) else {
                continue;
            };
            self.inventory_repo
                .release_reservation(&mut **tx, kind, inventory_item_id, item.qty, consume_stock)
                .await?;
        }
        Ok(())
    }

    // ---
    // Visibilidade
    // ---

    async fn visible_orders(&self, actor: &ActorContext) -> Result<Vec<Order>, AppError> {
        if actor.is_admin_like() || actor.has_role(Role::SupportOps) {
            return self.order_repo.list_all_orders().await;
        }
        if actor.has_role(Role::Ambassador) {
            return match self.scope_service.group_scope(actor).await? {
                GroupScope::All => self.order_repo.list_all_orders().await,
                GroupScope::Restricted { buyer_ids, .. } => {
                    let ids: Vec<i32> = buyer_ids.into_iter().collect();
                    self.order_repo.list_orders_for_buyers(&ids).await
                }
            };
        }
        if actor.has_role(Role::Seller) {
            return self.order_repo.list_orders_for_seller(actor.user_id).await;
        }
        self.order_repo.list_orders_for_buyers(&[actor.user_id]).await
    }

    async fn check_order_visible(
        &self,
        actor: &ActorContext,
        order: &Order,
    ) -> Result<(), AppError> {
        if actor.is_admin_like() || actor.has_role(Role::SupportOps) {
            return Ok(());
        }
        if order.buyer_id == actor.user_id || order.seller_id == Some(actor.user_id) {
            return Ok(());
        }
        if actor.has_role(Role::Ambassador) {
            let scope = self.scope_service.group_scope(actor).await?;
            if scope.can_see_buyer(order.buyer_id) {
                return Ok(());
            }
        }
        Err(AppError::forbidden("você não tem acesso a este pedido"))
    }

    async fn check_group_visible(
        &self,
        actor: &ActorContext,
        group: &OrderGroup,
        orders: &[Order],
    ) -> Result<(), AppError> {
        if actor.is_admin_like() || actor.has_role(Role::SupportOps) {
            return Ok(());
        }
        if group.buyer_id == actor.user_id {
            return Ok(());
        }
        if orders.iter().any(|o| o.seller_id == Some(actor.user_id)) {
            return Ok(());
        }
        if actor.has_role(Role::Ambassador) {
            let scope = self.scope_service.group_scope(actor).await?;
            if scope.can_see_buyer(group.buyer_id) {
                return Ok(());
            }
        }
        Err(AppError::forbidden("você não tem acesso a este grupo de pedidos"))
    }

    // ---
    // Montagem das respostas
    // ---

    async fn build_order_response(
        &self,
        order: Order,
        items: Option<Vec<crate::models::order::OrderItem>>,
    ) -> Result<OrderResponse, AppError> {
        let items = match items {
            Some(items) => items,
            None => self.order_repo.items_of_order(&self.pool, order.id).await?,
        };

        let group_number = self
            .order_repo
            .get_group(order.order_group_id)
            .await?
            .map(|g| g.group_number);

        let (seller_name, supplier_name, source_label) = match (order.seller_id, order.supplier_id) {
            (Some(seller_id), _) => {
                let seller = self.user_repo.find_by_id(&self.pool, seller_id).await?;
                let name = seller
                    .as_ref()
                    .and_then(|u| u.display_name())
                    .or_else(|| seller.as_ref().map(|u| u.email.clone()));
                let label = name.clone().unwrap_or_else(|| format!("seller {seller_id}"));
                (name, None, label)
            }
            (None, Some(supplier_id)) => {
                let supplier = self.supplier_repo.get(&self.pool, supplier_id).await?;
                let name = supplier.map(|s| s.supplier_name);
                let label = name.clone().unwrap_or_else(|| format!("fornecedor {supplier_id}"));
                (None, name, label)
            }
            (None, None) => (None, None, "desconhecida".to_string()),
        };

        Ok(OrderResponse {
            id: order.id,
            order_number: order.order_number,
            order_group_id: order.order_group_id,
            group_number,
            buyer_id: order.buyer_id,
            seller_id: order.seller_id,
            supplier_id: order.supplier_id,
            seller_name,
            supplier_name,
            source_label,
            status: order.status,
            total_amount: order.total_amount,
            currency: order.currency,
            items: items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    sku: i.sku,
                    name: i.name,
                    product_id: i.product_id,
                    inventory_kind: i.inventory_kind,
                    source_inventory_item_id: i.source_inventory_item_id,
                    qty: i.qty,
                    unit_price: i.unit_price,
                })
                .collect(),
        })
    }

    async fn build_group_response(
        &self,
        group: OrderGroup,
        orders: Vec<(Order, Vec<crate::models::order::OrderItem>)>,
    ) -> Result<OrderGroupResponse, AppError> {
        let buyer = self.user_repo.find_by_id(&self.pool, group.buyer_id).await?;

        let mut order_responses = Vec::with_capacity(orders.len());
        for (order, items) in orders {
            order_responses.push(self.build_order_response(order, Some(items)).await?);
        }

        Ok(OrderGroupResponse {
            order_group_id: group.id,
            group_number: group.group_number,
            buyer_id: group.buyer_id,
            buyer_email: buyer.as_ref().map(|u| u.email.clone()),
            buyer_name: buyer.as_ref().and_then(|u| u.display_name()),
            total_amount: group.total_amount,
            currency: group.currency,
            created_at: group.created_at,
            orders: order_responses,
        })
    }
}

fn prefix_line(index: usize, err: AppError) -> AppError {
    match err {
        AppError::Invalid(msg) => AppError::invalid(format!("item {index}: {msg}")),
        AppError::NotFound(msg) => AppError::not_found(format!("item {index}: {msg}")),
        AppError::Conflict(msg) => AppError::conflict(format!("item {index}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(seller: Option<i32>, supplier: Option<i32>) -> CreateOrderItemPayload {
        CreateOrderItemPayload {
            seller_id: seller,
            supplier_id: supplier,
            sku: "SKU-1".into(),
            name: "Batata".into(),
            product_id: 1,
            inventory_kind: InventoryKind::Regular,
            source_inventory_item_id: 10,
            qty: 2,
            unit_price: Decimal::new(250, 2),
        }
    }

    #[test]
    fn line_override_wins_over_payload_default() {
        let resolved = resolve_source(Some(5), None, &line(Some(7), None)).unwrap();
        assert_eq!(resolved, OrderSource::Seller(7));
    }

    #[test]
    fn source_must_be_exactly_one_side() {
        assert!(resolve_source(None, None, &line(None, None)).is_err());
        assert!(resolve_source(Some(5), Some(3), &line(None, None)).is_err());
        assert!(resolve_source(None, Some(3), &line(None, None)).is_ok());
        // default seller + override supplier: os dois lados presentes
        assert!(resolve_source(Some(5), None, &line(None, Some(3))).is_err());
    }

    #[test]
    fn grouping_preserves_first_appearance_order() {
        let mk = |source: OrderSource, sku: &str| ValidatedLine {
            source,
            sku: sku.into(),
            name: "x".into(),
            product_id: 1,
            kind: InventoryKind::Regular,
            inventory_item_id: 1,
            qty: 1,
            unit_price: Decimal::ONE,
        };

        let grouped = group_by_source(vec![
            mk(OrderSource::Seller(5), "a"),
            mk(OrderSource::Supplier(3), "b"),
            mk(OrderSource::Seller(5), "c"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, OrderSource::Seller(5));
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, OrderSource::Supplier(3));
    }

    #[test]
    fn line_total_uses_rounded_price() {
        let l = ValidatedLine {
            source: OrderSource::Seller(1),
            sku: "s".into(),
            name: "n".into(),
            product_id: 1,
            kind: InventoryKind::Regular,
            inventory_item_id: 1,
            qty: 3,
            unit_price: Decimal::new(10005, 4).round_dp(2), // 1.0005 -> 1.00
        };
        assert_eq!(l.line_total(), Decimal::new(300, 2));
    }

    #[test]
    fn stamp_has_microsecond_precision() {
        let stamp = timestamp_stamp();
        assert_eq!(stamp.len(), 20); // AAAAMMDDHHMMSS + 6 dígitos
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }
}
