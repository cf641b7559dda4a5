// src/models/procurement.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProcurementStatus {
    Draft,
    Placed,
    Received,
    Cancelled,
}

impl ProcurementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcurementStatus::Draft => "draft",
            ProcurementStatus::Placed => "placed",
            ProcurementStatus::Received => "received",
            ProcurementStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<ProcurementStatus> {
        match value {
            "draft" => Some(ProcurementStatus::Draft),
            "placed" => Some(ProcurementStatus::Placed),
            "received" => Some(ProcurementStatus::Received),
            "cancelled" => Some(ProcurementStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProcurementOrder {
    pub procurement_id: i32,
    pub supplier_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub procurement_date: DateTime<Utc>,
    pub status: String,
    // Uma compra recebida só pode ser empurrada para o estoque uma vez.
    pub pushed_to_inventory: bool,
    pub created_by_admin_user_id: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProcurementOrderReview {
    pub review_id: i32,
    pub procurement_id: i32,
    pub supplier_id: i32,
    pub product_id: i32,
    pub rating: i32,
    pub review_text: Option<String>,
    pub reviewed_by_user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProcurementOrderReviewImage {
    pub image_id: i32,
    pub review_id: i32,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProcurementOrderPayload {
    pub supplier_id: i32,
    pub product_id: i32,

    #[validate(range(min = 1, message = "quantity deve ser um inteiro positivo."))]
    pub quantity: i32,

    pub price_per_unit: Decimal,

    pub status: Option<ProcurementStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProcurementStatusPayload {
    pub status: ProcurementStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcurementOrderResponse {
    pub procurement_id: i32,
    pub supplier_id: i32,
    pub supplier_name: Option<String>,
    pub product_id: i32,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub procurement_date: DateTime<Utc>,
    pub status: String,
    pub pushed_to_inventory: bool,
    pub created_by_admin_user_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcurementReviewResponse {
    pub review_id: i32,
    pub procurement_id: i32,
    pub supplier_id: i32,
    pub product_id: i32,
    pub rating: i32,
    pub review_text: Option<String>,
    pub reviewed_by_user_id: i32,
    pub created_at: DateTime<Utc>,
    pub order_status: String,
    pub image_urls: Vec<String>,
}
