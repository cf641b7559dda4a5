// src/services/region_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{RegionRepository, UserRepository},
    models::{
        auth::Role,
        region::{
            DistributionLevel, Region, RegionDefaultsPayload, RegionPayload, RegionResponse,
            RegionType, RegroupLocalPayload, major_ancestor_of, validate_hierarchy,
        },
    },
};

#[derive(Clone)]
pub struct RegionService {
    region_repo: RegionRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl RegionService {
    pub fn new(region_repo: RegionRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { region_repo, user_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<RegionResponse>, AppError> {
        let regions = self.region_repo.list_all().await?;
        let defaults = self.region_repo.list_defaults().await?;

        Ok(regions
            .into_iter()
            .map(|region| {
                let d = defaults.iter().find(|d| d.region_id == region.region_id);
                RegionResponse {
                    default_admin_user_id: d.and_then(|d| d.default_admin_user_id),
                    default_ambassador_user_id: d.and_then(|d| d.default_ambassador_user_id),
                    region,
                }
            })
            .collect())
    }

    pub async fn get(&self, region_id: i32) -> Result<RegionResponse, AppError> {
        let region = self
            .region_repo
            .get(&self.pool, region_id)
            .await?
            .ok_or_else(|| AppError::not_found("região não encontrada"))?;
        let defaults = self.region_repo.get_default(region_id).await?;
        Ok(RegionResponse {
            default_admin_user_id: defaults.as_ref().and_then(|d| d.default_admin_user_id),
            default_ambassador_user_id: defaults.as_ref().and_then(|d| d.default_ambassador_user_id),
            region,
        })
    }

    pub async fn create(&self, payload: RegionPayload) -> Result<Region, AppError> {
        let parent = self.load_parent(payload.parent_region_id).await?;
        validate_hierarchy(
            payload.region_type,
            payload.distribution_level,
            payload.parent_region_id,
            parent.as_ref(),
        )
        .map_err(AppError::invalid)?;

        self.region_repo
            .create(
                &self.pool,
                &payload.region_name,
                payload.region_description.as_deref(),
                payload.region_type.as_str(),
                payload.distribution_level.map(|l| l.as_str()),
                payload.parent_region_id,
            )
            .await
    }

    /// Edição não muda o tipo da região; o nível e o pai podem mudar
    /// desde que a hierarquia continue válida.
    pub async fn update(&self, region_id: i32, payload: RegionPayload) -> Result<Region, AppError> {
        let existing = self
            .region_repo
            .get(&self.pool, region_id)
            .await?
            .ok_or_else(|| AppError::not_found("região não encontrada"))?;

        let existing_type = existing
            .kind()
            .ok_or_else(|| AppError::invalid("região com tipo desconhecido no banco"))?;
        if payload.region_type != existing_type {
            return Err(AppError::invalid("o tipo de uma região não pode ser alterado"));
        }
        if payload.parent_region_id == Some(region_id) {
            return Err(AppError::invalid("uma região não pode ser pai de si mesma"));
        }

        let parent = self.load_parent(payload.parent_region_id).await?;
        validate_hierarchy(
            payload.region_type,
            payload.distribution_level,
            payload.parent_region_id,
            parent.as_ref(),
        )
        .map_err(AppError::invalid)?;

        self.region_repo
            .update(
                region_id,
                &payload.region_name,
                payload.region_description.as_deref(),
                payload.distribution_level.map(|l| l.as_str()),
                payload.parent_region_id,
            )
            .await?
            .ok_or_else(|| AppError::not_found("região não encontrada"))
    }

    pub async fn delete(&self, region_id: i32) -> Result<(), AppError> {
        if self.region_repo.has_children(region_id).await? {
            return Err(AppError::conflict(
                "a região possui sub-regiões; remova ou mova as filhas antes",
            ));
        }
        if !self.region_repo.delete(region_id).await? {
            return Err(AppError::not_found("região não encontrada"));
        }
        Ok(())
    }

    /// Define os responsáveis padrão da região. O tipo da região decide o
    /// campo aplicável: source guarda o admin padrão, distribution guarda
    /// o embaixador padrão; o campo oposto é zerado no upsert.
    pub async fn set_defaults(
        &self,
        region_id: i32,
        payload: RegionDefaultsPayload,
    ) -> Result<RegionResponse, AppError> {
        let region = self
            .region_repo
            .get(&self.pool, region_id)
            .await?
            .ok_or_else(|| AppError::not_found("região não encontrada"))?;
        let kind = region
            .kind()
            .ok_or_else(|| AppError::invalid("região com tipo desconhecido no banco"))?;

        let (admin_id, ambassador_id) = defaults_for_kind(kind, &payload);

        if let Some(admin_id) = admin_id {
            let admin = self
                .user_repo
                .find_with_roles(admin_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("usuário {admin_id} não encontrado")))?;
            if !admin.has_role(Role::Admin) && !admin.has_role(Role::SuperAdmin) {
                return Err(AppError::invalid(
                    "o admin padrão precisa ter papel admin ou super_admin",
                ));
            }
        }
        if let Some(ambassador_id) = ambassador_id {
            self.require_role(
                ambassador_id,
                Role::Ambassador,
                "o embaixador padrão precisa ter papel ambassador",
            )
            .await?;
        }

        let defaults = self
            .region_repo
            .upsert_default(region_id, admin_id, ambassador_id)
            .await?;

        Ok(RegionResponse {
            default_admin_user_id: defaults.default_admin_user_id,
            default_ambassador_user_id: defaults.default_ambassador_user_id,
            region,
        })
    }

    /// Reagrupa regiões locais sob uma minor nova: cria a minor debaixo
    /// da major dada e move as locals para ela, tudo em uma transação.
    pub async fn regroup_locals(&self, payload: RegroupLocalPayload) -> Result<Region, AppError> {
        let major = self
            .region_repo
            .get(&self.pool, payload.major_region_id)
            .await?
            .ok_or_else(|| AppError::not_found("região major não encontrada"))?;
        if major.level() != Some(DistributionLevel::Major) {
            return Err(AppError::invalid("major_region_id não aponta para uma região major"));
        }

        // Cada local precisa existir, ser local e já pertencer à mesma major.
        let mut locals = Vec::with_capacity(payload.local_region_ids.len());
        for &local_id in &payload.local_region_ids {
            let local = self
                .region_repo
                .get(&self.pool, local_id)
                .await?
                .ok_or_else(|| {
                    AppError::not_found(format!("região local {local_id} não encontrada"))
                })?;
            if local.level() != Some(DistributionLevel::Local) {
                return Err(AppError::invalid(format!(
                    "região {local_id} não é uma região local"
                )));
            }

            let regions = self.region_repo.list_distribution().await?;
            let ancestor = major_ancestor_of(&local, |id| {
                regions.iter().find(|r| r.region_id == id).cloned()
            });
            if ancestor != Some(major.region_id) {
                return Err(AppError::invalid(format!(
                    "região local {local_id} não pertence à major informada"
                )));
            }
            locals.push(local);
        }

        let mut tx = self.pool.begin().await?;
        let minor = self
            .region_repo
            .create(
                &mut *tx,
                &payload.new_minor_name,
                payload.new_minor_description.as_deref(),
                RegionType::Distribution.as_str(),
                Some(DistributionLevel::Minor.as_str()),
                Some(major.region_id),
            )
            .await?;
        for local in &locals {
            self.region_repo
                .reparent(&mut *tx, local.region_id, minor.region_id)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(
            minor_region_id = minor.region_id,
            locals = locals.len(),
            "regiões locais reagrupadas"
        );
        Ok(minor)
    }

    async fn load_parent(&self, parent_region_id: Option<i32>) -> Result<Option<Region>, AppError> {
        match parent_region_id {
            Some(id) => Ok(self.region_repo.get(&self.pool, id).await?),
            None => Ok(None),
        }
    }

    async fn require_role(&self, user_id: i32, role: Role, message: &str) -> Result<(), AppError> {
        let user = self
            .user_repo
            .find_with_roles(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("usuário {user_id} não encontrado")))?;
        if !user.has_role(role) {
            return Err(AppError::invalid(message));
        }
        Ok(())
    }
}

// Roteia os responsáveis padrão pelo tipo da região: regiões source só
// guardam admin padrão, regiões distribution só guardam embaixador
// padrão. Devolve (admin, embaixador) com o lado não aplicável zerado.
fn defaults_for_kind(
    kind: RegionType,
    payload: &RegionDefaultsPayload,
) -> (Option<i32>, Option<i32>) {
    match kind {
        RegionType::Source => (payload.default_admin_user_id, None),
        RegionType::Distribution => (None, payload.default_ambassador_user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(admin: Option<i32>, ambassador: Option<i32>) -> RegionDefaultsPayload {
        RegionDefaultsPayload {
            default_admin_user_id: admin,
            default_ambassador_user_id: ambassador,
        }
    }

    #[test]
    fn source_region_keeps_only_default_admin() {
        let (admin, ambassador) =
            defaults_for_kind(RegionType::Source, &payload(Some(7), Some(8)));
        assert_eq!(admin, Some(7));
        assert_eq!(ambassador, None);
    }

    #[test]
    fn distribution_region_keeps_only_default_ambassador() {
        let (admin, ambassador) =
            defaults_for_kind(RegionType::Distribution, &payload(Some(7), Some(8)));
        assert_eq!(admin, None);
        assert_eq!(ambassador, Some(8));
    }

    #[test]
    fn absent_fields_stay_absent() {
        assert_eq!(defaults_for_kind(RegionType::Source, &payload(None, None)), (None, None));
        assert_eq!(
            defaults_for_kind(RegionType::Distribution, &payload(None, None)),
            (None, None)
        );
    }
}
