// src/models/product.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Tipo de produto cujos itens de estoque vão para a tabela de hortifrúti.
pub const FRESH_PRODUCE_TYPE: &str = "fresh_produce";

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: i32,
    pub product_name: String,
    pub product_type: String,
    pub product_unit: String,
    // Janela de validade em dias; None = não expira.
    pub validity_days: Option<i32>,
}

impl Product {
    pub fn is_fresh_produce(&self) -> bool {
        self.product_type.trim().eq_ignore_ascii_case(FRESH_PRODUCE_TYPE)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProductType {
    pub id: i32,
    pub product_type: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 100, message = "product_name deve ter entre 1 e 100 caracteres."))]
    pub product_name: String,

    #[validate(length(min = 1, max = 50, message = "product_type deve ter entre 1 e 50 caracteres."))]
    pub product_type: String,

    #[validate(length(min = 1, max = 10, message = "product_unit deve ter entre 1 e 10 caracteres."))]
    pub product_unit: String,

    #[validate(range(min = 1, max = 36500, message = "validity_days deve estar entre 1 e 36500."))]
    pub validity_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductTypePayload {
    #[validate(length(min = 1, max = 50, message = "product_type deve ter entre 1 e 50 caracteres."))]
    pub product_type: String,
}
