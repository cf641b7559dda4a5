// src/models/auth.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Papéis conhecidos do sistema. Nada de comparação por prefixo de string:
// tudo vira enum na entrada e operação de conjunto daí em diante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Ambassador,
    Seller,
    Buyer,
    SupportOps,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Ambassador => "ambassador",
            Role::Seller => "seller",
            Role::Buyer => "buyer",
            Role::SupportOps => "support_ops",
        }
    }

    // Papéis desconhecidos no banco/claims são simplesmente ignorados.
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "super_admin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "ambassador" => Some(Role::Ambassador),
            "seller" => Some(Role::Seller),
            "buyer" => Some(Role::Buyer),
            "support_ops" => Some(Role::SupportOps),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerStatus {
    PendingValidation,
    Valid,
    Rejected,
}

impl SellerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerStatus::PendingValidation => "pending_validation",
            SellerStatus::Valid => "valid",
            SellerStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<SellerStatus> {
        match value {
            "pending_validation" => Some(SellerStatus::PendingValidation),
            "valid" => Some(SellerStatus::Valid),
            "rejected" => Some(SellerStatus::Rejected),
            _ => None,
        }
    }
}

// Identidade verificada do chamador, extraída do token pelo middleware.
// Toda operação de serviço recebe isso como argumento explícito; nenhum
// estado ambiente de requisição.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: i32,
    pub roles: HashSet<Role>,
    pub permissions: HashSet<String>,
}

impl ActorContext {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(Role::SuperAdmin)
    }

    pub fn is_admin_like(&self) -> bool {
        self.has_role(Role::Admin) || self.has_role(Role::SuperAdmin)
    }

    pub fn has_permission(&self, code: &str) -> bool {
        self.permissions.contains(code)
    }
}

// Representa um usuário vindo do banco de dados. Os papéis moram em
// user_roles e são carregados à parte pelo repositório.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
    pub region: Option<String>,
    pub source_region_id: Option<i32>,
    pub major_distribution_region_id: Option<i32>,
    pub assigned_admin_user_id: Option<i32>,
    pub seller_status: Option<String>,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> Option<String> {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let full = full.trim().to_string();
        if full.is_empty() { None } else { Some(full) }
    }
}

// Usuário + papéis já resolvidos (um SELECT extra em user_roles).
#[derive(Debug, Clone)]
pub struct UserWithRoles {
    pub user: User,
    pub roles: HashSet<Role>,
}

impl UserWithRoles {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn seller_status(&self) -> Option<SellerStatus> {
        self.user.seller_status.as_deref().and_then(SellerStatus::parse)
    }
}

// Estrutura de dados ("claims") dentro do JWT. A identidade é o id do
// usuário serializado como string, igual ao emissor original.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    // "buyer" (padrão) ou "seller".
    pub role: Option<String>,

    // Obrigatório para sellers.
    pub source_region_id: Option<i32>,

    // Obrigatório para buyers.
    pub major_distribution_region_id: Option<i32>,

    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfilePayload,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BootstrapAdminPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfilePayload,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ProfilePayload {
    #[validate(length(max = 250, message = "first_name excede 250 caracteres."))]
    pub first_name: Option<String>,
    #[validate(length(max = 250, message = "last_name excede 250 caracteres."))]
    pub last_name: Option<String>,
    #[validate(length(max = 100, message = "address_line1 excede 100 caracteres."))]
    pub address_line1: Option<String>,
    #[validate(length(max = 100, message = "address_line2 excede 100 caracteres."))]
    pub address_line2: Option<String>,
    #[validate(length(max = 100, message = "address_line3 excede 100 caracteres."))]
    pub address_line3: Option<String>,
    #[validate(length(max = 6, message = "zip_code excede 6 caracteres."))]
    pub zip_code: Option<String>,
    #[validate(length(max = 12, message = "phone_number excede 12 caracteres."))]
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "region excede 100 caracteres."))]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub roles: Vec<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub region: Option<String>,
    pub source_region_id: Option<i32>,
    pub major_distribution_region_id: Option<i32>,
    pub seller_status: Option<String>,
    pub assigned_admin_user_id: Option<i32>,
    pub is_active: bool,
}

impl UserResponse {
    pub fn from_user(user: &User, roles: &HashSet<Role>) -> Self {
        let mut role_names: Vec<String> =
            roles.iter().map(|r| r.as_str().to_string()).collect();
        role_names.sort();
        Self {
            id: user.id,
            email: user.email.clone(),
            roles: role_names,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            region: user.region.clone(),
            source_region_id: user.source_region_id,
            major_distribution_region_id: user.major_distribution_region_id,
            seller_status: user.seller_status.clone(),
            assigned_admin_user_id: user.assigned_admin_user_id,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolesPayload {
    // Substitui o conjunto inteiro de papéis do usuário.
    #[validate(length(min = 1, message = "roles não pode ser vazio."))]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SellerValidationPayload {
    // "valid" ou "rejected".
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReassignSellerPayload {
    pub assigned_admin_user_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignBuyerPayload {
    // Ausente = o próprio embaixador autenticado.
    pub ambassador_user_id: Option<i32>,
    pub buyer_user_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerGroupResponse {
    pub ambassadors: Vec<UserResponse>,
    pub buyers: Vec<UserResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyerGroupOptionsQuery {
    // Ausente = a região de posse de nível mais alto do chamador.
    pub region_id: Option<i32>,
}

// Opções de montagem de grupo: as regiões de posse do embaixador e o
// recorte de uma delas. Admins recebem owned_regions vazio e tudo visível.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerGroupOptionsResponse {
    pub owned_regions: Vec<crate::models::region::Region>,
    pub selected_region_id: Option<i32>,
    pub ambassadors: Vec<UserResponse>,
    pub buyers: Vec<UserResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}
