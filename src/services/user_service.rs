// src/services/user_service.rs
//
// Administração de usuários: papéis, validação de sellers e os grupos
// embaixador-comprador.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{
        ActorContext, AssignBuyerPayload, BuyerGroupOptionsResponse, BuyerGroupResponse,
        ReassignSellerPayload, Role, SellerStatus, SellerValidationPayload, UpdateRolesPayload,
        UserResponse,
    },
    services::scope_service::{GroupScope, ScopeService, scope_for_region},
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    scope_service: ScopeService,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, scope_service: ScopeService, pool: PgPool) -> Self {
        Self { user_repo, scope_service, pool }
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.user_repo.list_with_roles().await?;
        Ok(users
            .iter()
            .map(|u| UserResponse::from_user(&u.user, &u.roles))
            .collect())
    }

    pub async fn get(&self, user_id: i32) -> Result<UserResponse, AppError> {
        let user = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;
        Ok(UserResponse::from_user(&user.user, &user.roles))
    }

    /// Substitui o conjunto de papéis de um usuário. Conceder admin ou
    /// super_admin exige que o chamador seja super_admin; ninguém tira o
    /// próprio super_admin.
    pub async fn update_roles(
        &self,
        actor: &ActorContext,
        user_id: i32,
        payload: UpdateRolesPayload,
    ) -> Result<UserResponse, AppError> {
        let mut roles = Vec::with_capacity(payload.roles.len());
        for name in &payload.roles {
            let role = Role::parse(name)
                .ok_or_else(|| AppError::invalid(format!("papel desconhecido: {name}")))?;
            roles.push(role);
        }

        let grants_admin =
            roles.iter().any(|r| matches!(r, Role::Admin | Role::SuperAdmin));
        if grants_admin && !actor.is_super_admin() {
            return Err(AppError::forbidden(
                "apenas super_admin concede papéis administrativos",
            ));
        }
        if user_id == actor.user_id
            && actor.is_super_admin()
            && !roles.contains(&Role::SuperAdmin)
        {
            return Err(AppError::invalid(
                "você não pode remover o seu próprio papel super_admin",
            ));
        }

        let existing = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;

        let mut tx = self.pool.begin().await?;
        self.user_repo.set_roles(&mut tx, user_id, &roles).await?;

        // Quem ganha o papel seller pela primeira vez entra pendente.
        if roles.contains(&Role::Seller) && existing.user.seller_status.is_none() {
            self.user_repo
                .set_seller_status(
                    &mut *tx,
                    user_id,
                    SellerStatus::PendingValidation.as_str(),
                )
                .await?;
        }
        tx.commit().await?;

        tracing::info!(user_id, roles = ?payload.roles, "papéis atualizados");
        self.get(user_id).await
    }

    // ---
    // Validação de sellers
    // ---

    pub async fn list_sellers(&self, actor: &ActorContext) -> Result<Vec<UserResponse>, AppError> {
        // super_admin vê todos; admin vê os sellers atribuídos a ele.
        let filter = if actor.is_super_admin() { None } else { Some(actor.user_id) };
        let sellers = self.user_repo.sellers_assigned_to(filter).await?;
        Ok(sellers
            .iter()
            .map(|u| UserResponse::from_user(&u.user, &u.roles))
            .collect())
    }

    /// Valida ou rejeita um seller. Admin comum só decide sobre os
    /// sellers atribuídos a ele; super_admin decide sobre qualquer um.
    pub async fn validate_seller(
        &self,
        actor: &ActorContext,
        user_id: i32,
        payload: SellerValidationPayload,
    ) -> Result<UserResponse, AppError> {
        let status = match SellerStatus::parse(&payload.status) {
            Some(s @ (SellerStatus::Valid | SellerStatus::Rejected)) => s,
            _ => {
                return Err(AppError::invalid("status deve ser valid ou rejected"));
            }
        };

        let user = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;
        if !user.has_role(Role::Seller) {
            return Err(AppError::invalid("o usuário não tem papel seller"));
        }
        if !actor.is_super_admin()
            && user.user.assigned_admin_user_id != Some(actor.user_id)
        {
            return Err(AppError::forbidden(
                "o seller não está atribuído a você",
            ));
        }

        self.user_repo
            .set_seller_status(&self.pool, user_id, status.as_str())
            .await?
            .ok_or_else(|| AppError::not_found("usuário não encontrado"))?;

        tracing::info!(user_id, status = status.as_str(), "seller validado");
        self.get(user_id).await
    }

    /// Transfere um seller para outro admin responsável. Só super_admin.
    pub async fn reassign_seller(
        &self,
        actor: &ActorContext,
        user_id: i32,
        payload: ReassignSellerPayload,
    ) -> Result<UserResponse, AppError> {
        if !actor.is_super_admin() {
            return Err(AppError::forbidden(
                "apenas super_admin transfere sellers entre admins",
            ));
        }

        let seller = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("seller não encontrado"))?;
        if !seller.has_role(Role::Seller) {
            return Err(AppError::invalid("o usuário não tem papel seller"));
        }

        let admin = self
            .user_repo
            .find_with_roles(payload.assigned_admin_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("admin não encontrado"))?;
        if !admin.has_role(Role::Admin) && !admin.has_role(Role::SuperAdmin) {
            return Err(AppError::invalid(
                "o responsável precisa ter papel admin ou super_admin",
            ));
        }

        self.user_repo
            .set_assigned_admin(user_id, payload.assigned_admin_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("seller não encontrado"))?;

        tracing::info!(
            user_id,
            admin_id = payload.assigned_admin_user_id,
            "seller transferido de admin"
        );
        self.get(user_id).await
    }

    // ---
    // Grupos de compradores
    // ---

    /// O grupo visível para o chamador: embaixadores e compradores do
    /// escopo resolvido.
    pub async fn buyer_group(&self, actor: &ActorContext) -> Result<BuyerGroupResponse, AppError> {
        let scope = self.scope_service.group_scope(actor).await?;
        let users = self.user_repo.list_with_roles().await?;

        let (ambassadors, buyers) = match scope {
            GroupScope::All => {
                let ambassadors = users
                    .iter()
                    .filter(|u| u.has_role(Role::Ambassador))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect();
                let buyers = users
                    .iter()
                    .filter(|u| u.has_role(Role::Buyer))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect();
                (ambassadors, buyers)
            }
            GroupScope::Restricted { ambassador_ids, buyer_ids } => {
                let ambassadors = users
                    .iter()
                    .filter(|u| ambassador_ids.contains(&u.user.id))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect();
                let buyers = users
                    .iter()
                    .filter(|u| buyer_ids.contains(&u.user.id))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect();
                (ambassadors, buyers)
            }
        };

        Ok(BuyerGroupResponse { ambassadors, buyers })
    }

    /// Cria a aresta embaixador -> comprador. Embaixadores só mexem dentro
    /// do escopo resolvido; a aresta repetida é um no-op.
    pub async fn assign_buyer(
        &self,
        actor: &ActorContext,
        payload: AssignBuyerPayload,
    ) -> Result<(), AppError> {
        let (ambassador_id, scope) = self
            .resolve_ambassador(actor, payload.ambassador_user_id)
            .await?;

        let ambassador = self
            .user_repo
            .find_with_roles(ambassador_id)
            .await?
            .ok_or_else(|| AppError::not_found("embaixador não encontrado"))?;
        if !ambassador.has_role(Role::Ambassador) {
            return Err(AppError::invalid("o usuário informado não tem papel ambassador"));
        }
        let buyer = self
            .user_repo
            .find_with_roles(payload.buyer_user_id)
            .await?
            .ok_or_else(|| AppError::not_found("comprador não encontrado"))?;
        if !buyer.has_role(Role::Buyer) {
            return Err(AppError::invalid("o usuário informado não tem papel buyer"));
        }
        if !scope.can_see_buyer(payload.buyer_user_id) {
            return Err(AppError::forbidden(
                "o comprador está fora do seu escopo de regiões",
            ));
        }

        self.user_repo
            .assign_buyer_to_ambassador(&self.pool, ambassador_id, payload.buyer_user_id)
            .await?;
        tracing::info!(
            ambassador_id,
            buyer_id = payload.buyer_user_id,
            "comprador atribuído ao embaixador"
        );
        Ok(())
    }

    pub async fn remove_buyer(
        &self,
        actor: &ActorContext,
        payload: AssignBuyerPayload,
    ) -> Result<(), AppError> {
        let (ambassador_id, scope) = self
            .resolve_ambassador(actor, payload.ambassador_user_id)
            .await?;
        if !scope.can_see_buyer(payload.buyer_user_id) {
            return Err(AppError::forbidden(
                "o comprador está fora do seu escopo de regiões",
            ));
        }

        let existed = self
            .user_repo
            .remove_buyer_from_ambassador(ambassador_id, payload.buyer_user_id)
            .await?;
        if !existed {
            return Err(AppError::not_found(
                "o comprador não está atribuído a este embaixador",
            ));
        }
        Ok(())
    }

    /// Compradores explicitamente atribuídos a um embaixador, com o
    /// embaixador alvo sujeito ao escopo do chamador.
    pub async fn ambassador_buyers(
        &self,
        actor: &ActorContext,
        ambassador_user_id: i32,
    ) -> Result<Vec<UserResponse>, AppError> {
        let scope = self.scope_service.group_scope(actor).await?;
        if let GroupScope::Restricted { ambassador_ids, .. } = &scope {
            if !ambassador_ids.contains(&ambassador_user_id) {
                return Err(AppError::forbidden(
                    "o embaixador alvo está fora do seu escopo de regiões",
                ));
            }
        }

        // A listagem devolve só o perfil; os papéis não entram aqui.
        let no_roles = HashSet::new();
        let buyers = self.user_repo.buyers_of_ambassador(ambassador_user_id).await?;
        Ok(buyers
            .iter()
            .map(|u| UserResponse::from_user(u, &no_roles))
            .collect())
    }

    /// Opções de montagem de grupo: regiões de posse do chamador e o
    /// recorte de uma delas (a pedida ou a de nível mais alto).
    pub async fn buyer_group_options(
        &self,
        actor: &ActorContext,
        requested_region_id: Option<i32>,
    ) -> Result<BuyerGroupOptionsResponse, AppError> {
        let scope = self.scope_service.group_scope(actor).await?;
        let users = self.user_repo.list_with_roles().await?;

        if matches!(scope, GroupScope::All) {
            return Ok(BuyerGroupOptionsResponse {
                owned_regions: Vec::new(),
                selected_region_id: None,
                ambassadors: users
                    .iter()
                    .filter(|u| u.has_role(Role::Ambassador))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect(),
                buyers: users
                    .iter()
                    .filter(|u| u.has_role(Role::Buyer))
                    .map(|u| UserResponse::from_user(&u.user, &u.roles))
                    .collect(),
            });
        }

        let snapshot = self.scope_service.load_snapshot().await?;
        let owned: Vec<_> = snapshot
            .owned_regions(actor.user_id)
            .into_iter()
            .cloned()
            .collect();
        if owned.is_empty() {
            return Ok(BuyerGroupOptionsResponse {
                owned_regions: Vec::new(),
                selected_region_id: None,
                ambassadors: Vec::new(),
                buyers: Vec::new(),
            });
        }

        let selected_region_id = requested_region_id.unwrap_or(owned[0].region_id);
        let selected = owned
            .iter()
            .find(|r| r.region_id == selected_region_id)
            .ok_or_else(|| {
                AppError::forbidden("region_id está fora das regiões de posse do embaixador")
            })?;

        let (ambassador_ids, buyer_ids) = scope_for_region(&snapshot, selected, actor.user_id);
        let ambassadors = users
            .iter()
            .filter(|u| ambassador_ids.contains(&u.user.id) && u.has_role(Role::Ambassador))
            .map(|u| UserResponse::from_user(&u.user, &u.roles))
            .collect();
        let buyers = users
            .iter()
            .filter(|u| buyer_ids.contains(&u.user.id) && u.has_role(Role::Buyer))
            .map(|u| UserResponse::from_user(&u.user, &u.roles))
            .collect();

        Ok(BuyerGroupOptionsResponse {
            owned_regions: owned,
            selected_region_id: Some(selected_region_id),
            ambassadors,
            buyers,
        })
    }

    /// Resolve o embaixador alvo de uma operação de grupo e devolve o
    /// escopo do chamador. Admin informa o alvo; embaixador usa o próprio
    /// id por omissão e só alcança embaixadores do escopo resolvido.
    async fn resolve_ambassador(
        &self,
        actor: &ActorContext,
        requested: Option<i32>,
    ) -> Result<(i32, GroupScope), AppError> {
        let scope = self.scope_service.group_scope(actor).await?;
        let ambassador_id = match &scope {
            GroupScope::All => requested.ok_or_else(|| {
                AppError::invalid("ambassador_user_id é obrigatório para admins")
            })?,
            GroupScope::Restricted { ambassador_ids, .. } => {
                // Ausente = o próprio chamador, que também passa pelo
                // recorte (um dono de minor pode não estar no próprio
                // conjunto resolvido).
                let id = requested.unwrap_or(actor.user_id);
                if !ambassador_ids.contains(&id) {
                    return Err(AppError::forbidden(
                        "o embaixador alvo está fora do seu escopo de regiões",
                    ));
                }
                id
            }
        };
        Ok((ambassador_id, scope))
    }
}
