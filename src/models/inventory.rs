// src/models/inventory.rs
//
// Motor de disponibilidade de estoque. As duas tabelas (regular e
// hortifrúti) viram um único tipo com a quantidade armazenada etiquetada
// pela variante, para que expiração e reserva sejam calculadas uma vez só.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    Regular,
    FreshProduce,
}

impl InventoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryKind::Regular => "regular",
            InventoryKind::FreshProduce => "fresh_produce",
        }
    }

    pub fn parse(value: &str) -> Option<InventoryKind> {
        match value {
            "regular" => Some(InventoryKind::Regular),
            "fresh_produce" => Some(InventoryKind::FreshProduce),
            _ => None,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            InventoryKind::Regular => "inventory_items",
            InventoryKind::FreshProduce => "fresh_produce_inventory",
        }
    }

    // Coluna que guarda a quantidade armazenada em cada tabela.
    pub fn quantity_column(&self) -> &'static str {
        match self {
            InventoryKind::Regular => "quantity",
            InventoryKind::FreshProduce => "estimated_quantity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    SellerDirect,
    Procurement,
}

impl OriginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginType::SellerDirect => "seller_direct",
            OriginType::Procurement => "procurement",
        }
    }

}

// Quantidade armazenada, etiquetada pela origem da tabela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredQuantity {
    Regular { quantity: i32 },
    FreshProduce { estimated_quantity: i32 },
}

impl StoredQuantity {
    pub fn new(kind: InventoryKind, value: i32) -> Self {
        match kind {
            InventoryKind::Regular => StoredQuantity::Regular { quantity: value },
            InventoryKind::FreshProduce => StoredQuantity::FreshProduce {
                estimated_quantity: value,
            },
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            StoredQuantity::Regular { quantity } => *quantity,
            StoredQuantity::FreshProduce { estimated_quantity } => *estimated_quantity,
        }
    }

    pub fn kind(&self) -> InventoryKind {
        match self {
            StoredQuantity::Regular { .. } => InventoryKind::Regular,
            StoredQuantity::FreshProduce { .. } => InventoryKind::FreshProduce,
        }
    }
}

// Um registro de estoque, vindo de qualquer uma das duas tabelas.
#[derive(Debug, Clone)]
pub struct InventoryItem {
    pub id: i32,
    pub product_id: i32,
    pub seller_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub origin_type: String,
    pub origin: Option<String>,
    pub entry_date: DateTime<Utc>,
    pub created_by_admin_user_id: i32,
    pub stock: StoredQuantity,
    pub reserved_quantity: i32,
    pub price_per_unit: Decimal,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// O relógio de validade parte de `updated_at` (última mutação).
    /// Fronteira inclusiva: expirado quando `now >= updated_at + validade`.
    pub fn is_expired(&self, product: &Product, now: DateTime<Utc>) -> bool {
        let Some(validity_days) = product.validity_days else {
            return false;
        };
        let Some(updated_at) = self.updated_at else {
            return false;
        };
        now >= updated_at + Duration::days(i64::from(validity_days))
    }

    /// Fonte única da verdade para quanto pode ser vendido agora: zero se
    /// expirado, senão armazenado menos reservado, nunca negativo.
    pub fn available_quantity(&self, product: &Product, now: DateTime<Utc>) -> i32 {
        if self.is_expired(product, now) {
            return 0;
        }
        (self.stock.value() - self.reserved_quantity).max(0)
    }

    /// Valor de exibição nas listagens admin/seller: ignora reservas,
    /// zera apenas quando expirado.
    pub fn effective_quantity(&self, product: &Product, now: DateTime<Utc>) -> i32 {
        if self.is_expired(product, now) {
            0
        } else {
            self.stock.value()
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryItemPayload {
    pub product_id: i32,

    // Ignorado quando o chamador é um seller (usa o próprio id).
    pub seller_id: Option<i32>,

    #[validate(range(min = 0, message = "quantity deve ser um inteiro não-negativo."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryQuantityPayload {
    #[validate(range(min = 0, message = "quantity deve ser um inteiro não-negativo."))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryKindQuery {
    pub inventory_kind: Option<InventoryKind>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub seller_id: Option<i32>,
    pub product_id: Option<i32>,
    pub product_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItemResponse {
    pub id: i32,
    pub inventory_kind: InventoryKind,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub product_unit: Option<String>,
    pub product_validity_days: Option<i32>,
    pub seller_id: Option<i32>,
    pub seller_email: Option<String>,
    pub seller_status: Option<String>,
    pub supplier_id: Option<i32>,
    pub supplier_name: Option<String>,
    pub supplier_email: Option<String>,
    pub origin_type: String,
    pub origin: Option<String>,
    pub entry_date: DateTime<Utc>,
    // Quantidade "efetiva" (zerada quando expirado), sem descontar reservas.
    pub quantity: i32,
    pub estimated_quantity: Option<i32>,
    pub stored_quantity: i32,
    pub reserved_quantity: i32,
    pub is_expired: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_by_admin_user_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(validity_days: Option<i32>) -> Product {
        Product {
            id: 1,
            product_name: "Batata".into(),
            product_type: "tuberculo".into(),
            product_unit: "kg".into(),
            validity_days,
        }
    }

    fn item(stored: i32, reserved: i32, updated_at: Option<DateTime<Utc>>) -> InventoryItem {
        InventoryItem {
            id: 10,
            product_id: 1,
            seller_id: Some(5),
            supplier_id: None,
            origin_type: "seller_direct".into(),
            origin: Some("seller_direct".into()),
            entry_date: Utc::now(),
            created_by_admin_user_id: 1,
            stock: StoredQuantity::new(InventoryKind::Regular, stored),
            reserved_quantity: reserved,
            price_per_unit: Decimal::new(250, 2),
            updated_at,
        }
    }

    #[test]
    fn no_validity_window_never_expires() {
        let now = Utc::now();
        let it = item(10, 0, Some(now - Duration::days(10_000)));
        assert!(!it.is_expired(&product(None), now));
    }

    #[test]
    fn missing_updated_at_never_expires() {
        let now = Utc::now();
        let it = item(10, 0, None);
        assert!(!it.is_expired(&product(Some(1)), now));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let p = product(Some(10));

        // now - 9 dias: ainda válido
        let fresh = item(100, 0, Some(now - Duration::days(9)));
        assert!(!fresh.is_expired(&p, now));

        // now - 10 dias: exatamente na fronteira, expirado
        let stale = item(100, 0, Some(now - Duration::days(10)));
        assert!(stale.is_expired(&p, now));
    }

    #[test]
    fn available_is_zero_when_expired_regardless_of_stock() {
        let now = Utc::now();
        let p = product(Some(10));
        let it = item(100, 0, Some(now - Duration::days(30)));
        assert_eq!(it.available_quantity(&p, now), 0);
        assert_eq!(it.effective_quantity(&p, now), 0);
    }

    #[test]
    fn available_subtracts_reservation_and_floors_at_zero() {
        let now = Utc::now();
        let p = product(Some(10));

        let it = item(100, 20, Some(now - Duration::days(5)));
        assert_eq!(it.available_quantity(&p, now), 80);

        // reserva acima do estoque não fica negativa
        let over = item(10, 25, Some(now - Duration::days(5)));
        assert_eq!(over.available_quantity(&p, now), 0);
    }

    #[test]
    fn effective_ignores_reservation() {
        let now = Utc::now();
        let p = product(Some(10));
        let it = item(100, 90, Some(now - Duration::days(5)));
        assert_eq!(it.effective_quantity(&p, now), 100);
    }

    #[test]
    fn stored_quantity_dispatches_over_kind() {
        let regular = StoredQuantity::new(InventoryKind::Regular, 7);
        let fresh = StoredQuantity::new(InventoryKind::FreshProduce, 9);
        assert_eq!(regular.value(), 7);
        assert_eq!(regular.kind(), InventoryKind::Regular);
        assert_eq!(fresh.value(), 9);
        assert_eq!(fresh.kind(), InventoryKind::FreshProduce);
    }
}
