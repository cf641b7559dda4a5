// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::inventory::InventoryKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<OrderStatus> {
        match value {
            "created" => Some(OrderStatus::Created),
            "confirmed" => Some(OrderStatus::Confirmed),
            "packed" => Some(OrderStatus::Packed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    // delivered e cancelled são terminais: nenhuma escrita diferente do
    // valor atual é aceita depois disso.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Regra de transição: estados terminais são imutáveis; entre estados
/// não-terminais qualquer escrita é aceita (inclusive o atalho
/// created -> delivered/cancelled).
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    if from.is_terminal() {
        return from == to;
    }
    true
}

/// Efeito colateral de estoque de uma transição de status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryEffect {
    /// Nenhuma mutação de estoque.
    None,
    /// Libera a reserva (cancelamento: a mercadoria nunca saiu do estoque).
    ReleaseReservation,
    /// Libera a reserva e consome a quantidade armazenada (entrega).
    ReleaseAndConsume,
}

pub fn transition_effect(from: OrderStatus, to: OrderStatus) -> InventoryEffect {
    if from == to || from.is_terminal() {
        return InventoryEffect::None;
    }
    match to {
        OrderStatus::Delivered => InventoryEffect::ReleaseAndConsume,
        OrderStatus::Cancelled => InventoryEffect::ReleaseReservation,
        _ => InventoryEffect::None,
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderGroup {
    pub id: i32,
    pub group_number: String,
    pub buyer_id: i32,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub order_group_id: i32,
    pub buyer_id: i32,
    pub seller_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub status: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status_kind(&self) -> Option<OrderStatus> {
        OrderStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub sku: String,
    pub name: String,
    pub product_id: Option<i32>,
    pub inventory_kind: Option<String>,
    pub source_inventory_item_id: Option<i32>,
    pub qty: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderPayload {
    // Origem padrão, sobrescrevível linha a linha.
    pub seller_id: Option<i32>,
    pub supplier_id: Option<i32>,

    #[validate(length(min = 3, max = 3, message = "currency deve ter 3 letras."))]
    pub currency: Option<String>,

    #[validate(length(min = 1, message = "items não pode ser vazio."))]
    pub items: Vec<CreateOrderItemPayload>,
}

// O derive de Validate serializa `items` no parâmetro do erro de
// comprimento; as linhas precisam de Serialize.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderItemPayload {
    pub seller_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub sku: String,
    pub name: String,
    pub product_id: i32,
    pub inventory_kind: InventoryKind,
    pub source_inventory_item_id: i32,
    pub qty: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub product_id: Option<i32>,
    pub inventory_kind: Option<String>,
    pub source_inventory_item_id: Option<i32>,
    pub qty: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub order_number: String,
    pub order_group_id: i32,
    pub group_number: Option<String>,
    pub buyer_id: i32,
    pub seller_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub seller_name: Option<String>,
    pub supplier_name: Option<String>,
    pub source_label: String,
    pub status: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderGroupResponse {
    pub order_group_id: i32,
    pub group_number: String,
    pub buyer_id: i32,
    pub buyer_email: Option<String>,
    pub buyer_name: Option<String>,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub orders: Vec<OrderResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_reject_any_other_write() {
        assert!(!can_transition(OrderStatus::Delivered, OrderStatus::Confirmed));
        assert!(!can_transition(OrderStatus::Delivered, OrderStatus::Cancelled));
        assert!(!can_transition(OrderStatus::Cancelled, OrderStatus::Created));
        // reescrever o mesmo valor terminal é aceito (no-op)
        assert!(can_transition(OrderStatus::Delivered, OrderStatus::Delivered));
        assert!(can_transition(OrderStatus::Cancelled, OrderStatus::Cancelled));
    }

    #[test]
    fn shortcuts_from_created_are_allowed() {
        assert!(can_transition(OrderStatus::Created, OrderStatus::Delivered));
        assert!(can_transition(OrderStatus::Created, OrderStatus::Cancelled));
        assert!(can_transition(OrderStatus::Created, OrderStatus::Confirmed));
        assert!(can_transition(OrderStatus::Shipped, OrderStatus::Delivered));
    }

    #[test]
    fn delivery_releases_and_consumes() {
        assert_eq!(
            transition_effect(OrderStatus::Shipped, OrderStatus::Delivered),
            InventoryEffect::ReleaseAndConsume
        );
        assert_eq!(
            transition_effect(OrderStatus::Created, OrderStatus::Delivered),
            InventoryEffect::ReleaseAndConsume
        );
    }

    #[test]
    fn cancellation_only_releases() {
        assert_eq!(
            transition_effect(OrderStatus::Confirmed, OrderStatus::Cancelled),
            InventoryEffect::ReleaseReservation
        );
    }

    #[test]
    fn non_terminal_moves_have_no_inventory_effect() {
        assert_eq!(
            transition_effect(OrderStatus::Created, OrderStatus::Packed),
            InventoryEffect::None
        );
        assert_eq!(
            transition_effect(OrderStatus::Packed, OrderStatus::Packed),
            InventoryEffect::None
        );
        // escrita idempotente num terminal não mexe em estoque de novo
        assert_eq!(
            transition_effect(OrderStatus::Delivered, OrderStatus::Delivered),
            InventoryEffect::None
        );
    }

    #[test]
    fn empty_items_fail_payload_validation() {
        let payload = CreateOrderPayload {
            seller_id: None,
            supplier_id: None,
            currency: None,
            items: Vec::new(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }
}
