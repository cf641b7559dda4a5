// src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Supplier {
    pub supplier_id: i32,
    pub supplier_name: String,
    pub email: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vínculo fornecedor-produto; primary/secondary segue a classificação
// usada nas compras.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct SupplierProduct {
    pub id: i32,
    pub supplier_id: i32,
    pub product_id: i32,
    pub supplier_type: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SupplierPayload {
    #[validate(length(min = 1, max = 250, message = "supplier_name deve ter entre 1 e 250 caracteres."))]
    pub supplier_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(max = 100, message = "address_line1 excede 100 caracteres."))]
    pub address_line1: Option<String>,
    #[validate(length(max = 100, message = "address_line2 excede 100 caracteres."))]
    pub address_line2: Option<String>,
    #[validate(length(max = 100, message = "address_line3 excede 100 caracteres."))]
    pub address_line3: Option<String>,
    #[validate(length(max = 12, message = "phone_number excede 12 caracteres."))]
    pub phone_number: Option<String>,

    pub is_active: Option<bool>,

    // Produtos fornecidos: [{product_id, supplier_type}]
    #[serde(default)]
    pub product_links: Vec<SupplierProductLinkPayload>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupplierProductLinkPayload {
    pub product_id: i32,
    // "primary" (padrão) ou "secondary".
    pub supplier_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierResponse {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub product_links: Vec<SupplierProduct>,
}
