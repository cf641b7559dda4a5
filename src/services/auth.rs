// src/services/auth.rs

use std::collections::HashSet;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{RegionRepository, UserRepository},
    models::{
        auth::{
            ActorContext, AuthResponse, BootstrapAdminPayload, Claims, LoginPayload,
            ProfilePayload, RegisterPayload, Role, SellerStatus, UserResponse,
        },
        region::{DistributionLevel, RegionType},
    },
};

const ACCESS_TOKEN_DAYS: i64 = 1;
const REFRESH_TOKEN_DAYS: i64 = 30;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    region_repo: RegionRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        region_repo: RegionRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, region_repo, jwt_secret, pool }
    }

    /// Cria o primeiro administrador. Só funciona com o banco de usuários
    /// vazio; depois disso o endpoint passa a responder 403.
    pub async fn bootstrap_admin(
        &self,
        payload: BootstrapAdminPayload,
    ) -> Result<AuthResponse, AppError> {
        if self.user_repo.any_users_exist().await? {
            return Err(AppError::forbidden(
                "o bootstrap só está disponível enquanto não existem usuários",
            ));
        }

        let password_hash = hash_password(payload.password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.email,
                &password_hash,
                &payload.profile,
                None,
                None,
                None,
                None,
            )
            .await?;
        self.user_repo.grant_role(&mut *tx, user.id, Role::SuperAdmin).await?;
        self.user_repo.grant_role(&mut *tx, user.id, Role::Admin).await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "administrador inicial criado");
        self.issue_tokens(user.id).await
    }

    /// Auto-cadastro público: buyer (padrão) ou seller. Cada papel exige
    /// a sua âncora de região e herda os responsáveis padrão dela.
    pub async fn register(&self, payload: RegisterPayload) -> Result<AuthResponse, AppError> {
        let role = match payload.role.as_deref() {
            None | Some("buyer") => Role::Buyer,
            Some("seller") => Role::Seller,
            Some(other) => {
                return Err(AppError::invalid(format!(
                    "role '{other}' não é permitido no cadastro; use buyer ou seller"
                )));
            }
        };

        let mut seller_status = None;
        let mut source_region_id = None;
        let mut major_region_id = None;
        let mut assigned_admin_user_id = None;
        let mut default_ambassador_user_id = None;

        match role {
            Role::Seller => {
                let region_id = payload.source_region_id.ok_or_else(|| {
                    AppError::invalid("source_region_id é obrigatório para sellers")
                })?;
                let region = self
                    .region_repo
                    .get(&self.pool, region_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("região de origem não encontrada"))?;
                if region.kind() != Some(RegionType::Source) {
                    return Err(AppError::invalid(
                        "a região informada não é uma região de origem",
                    ));
                }

                // O seller nasce pendente e já vinculado ao admin padrão
                // da sua região, quando houver.
                if let Some(defaults) = self.region_repo.get_default(region_id).await? {
                    assigned_admin_user_id = defaults.default_admin_user_id;
                }
                seller_status = Some(SellerStatus::PendingValidation);
                source_region_id = Some(region_id);
            }
            Role::Buyer => {
                let region_id = payload.major_distribution_region_id.ok_or_else(|| {
                    AppError::invalid(
                        "major_distribution_region_id é obrigatório para buyers",
                    )
                })?;
                let region = self
                    .region_repo
                    .get(&self.pool, region_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("região de distribuição não encontrada"))?;
                if region.kind() != Some(RegionType::Distribution)
                    || region.level() != Some(DistributionLevel::Major)
                {
                    return Err(AppError::invalid(
                        "a região informada não é uma região de distribuição major",
                    ));
                }

                if let Some(defaults) = self.region_repo.get_default(region_id).await? {
                    default_ambassador_user_id = defaults.default_ambassador_user_id;
                }
                major_region_id = Some(region_id);
            }
            _ => unreachable!(),
        }

        let password_hash = hash_password(payload.password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.email,
                &password_hash,
                &payload.profile,
                seller_status.map(|s| s.as_str()),
                source_region_id,
                major_region_id,
                assigned_admin_user_id,
            )
            .await?;
        self.user_repo.grant_role(&mut *tx, user.id, role).await?;

        // Buyer novo já entra no grupo do embaixador padrão da major.
        if let Some(ambassador_id) = default_ambassador_user_id {
            self.user_repo
                .assign_buyer_to_ambassador(&mut *tx, ambassador_id, user.id)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id = user.id, role = role.as_str(), "novo usuário cadastrado");
        self.issue_tokens(user.id).await
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password = payload.password;
        let password_hash = user.password_hash.clone();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("falha na task de verificação de senha: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_tokens(user.id).await
    }

    /// Emite um novo par de tokens a partir de um token ainda válido,
    /// relendo papéis e permissões do banco.
    pub async fn refresh(&self, token: &str) -> Result<AuthResponse, AppError> {
        let actor = self.validate_token(token)?;
        self.issue_tokens(actor.user_id).await
    }

    /// Decodifica o token e monta o contexto do chamador a partir dos
    /// claims. Nenhuma consulta ao banco: os conjuntos de papéis e
    /// permissões viajam dentro do próprio token.
    pub fn validate_token(&self, token: &str) -> Result<ActorContext, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        let user_id: i32 = claims.sub.parse().map_err(|_| AppError::InvalidToken)?;

        let roles: HashSet<Role> =
            claims.roles.iter().filter_map(|name| Role::parse(name)).collect();
        let permissions: HashSet<String> = claims.permissions.into_iter().collect();

        Ok(ActorContext { user_id, roles, permissions })
    }

    pub async fn current_user(&self, actor: &ActorContext) -> Result<UserResponse, AppError> {
        let with_roles = self
            .user_repo
            .find_with_roles(actor.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;
        Ok(UserResponse::from_user(&with_roles.user, &with_roles.roles))
    }

    /// Atualiza os campos de perfil do próprio usuário. E-mail, senha e
    /// âncoras de região ficam de fora; têm fluxos próprios.
    pub async fn update_profile(
        &self,
        actor: &ActorContext,
        profile: ProfilePayload,
    ) -> Result<UserResponse, AppError> {
        self.user_repo
            .update_profile(actor.user_id, &profile)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;
        tracing::info!(user_id = actor.user_id, "perfil atualizado");
        self.current_user(actor).await
    }

    async fn issue_tokens(&self, user_id: i32) -> Result<AuthResponse, AppError> {
        let with_roles = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;
        let permissions = self.user_repo.permissions_of(&self.pool, user_id).await?;

        let mut role_names: Vec<String> =
            with_roles.roles.iter().map(|r| r.as_str().to_string()).collect();
        role_names.sort();
        let mut permission_codes: Vec<String> = permissions.into_iter().collect();
        permission_codes.sort();

        let access_token =
            self.create_token(user_id, &role_names, &permission_codes, ACCESS_TOKEN_DAYS)?;
        let refresh_token =
            self.create_token(user_id, &role_names, &permission_codes, REFRESH_TOKEN_DAYS)?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user: UserResponse::from_user(&with_roles.user, &with_roles.roles),
        })
    }

    fn create_token(
        &self,
        user_id: i32,
        roles: &[String],
        permissions: &[String],
        days: i64,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(days);

        let claims = Claims {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            permissions: permissions.to_vec(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("falha na task de hashing: {e}"))?
        .map_err(AppError::from)
}
