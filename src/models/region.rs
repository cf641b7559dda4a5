// src/models/region.rs
//
// Árvore de regiões: regiões de origem (sellers) são planas; regiões de
// distribuição (buyers) formam uma árvore rasa de profundidade fixa
// major -> minor -> local.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    Source,
    Distribution,
}

impl RegionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionType::Source => "source",
            RegionType::Distribution => "distribution",
        }
    }

    pub fn parse(value: &str) -> Option<RegionType> {
        match value {
            "source" => Some(RegionType::Source),
            "distribution" => Some(RegionType::Distribution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DistributionLevel {
    Major,
    Minor,
    Local,
}

impl DistributionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionLevel::Major => "major",
            DistributionLevel::Minor => "minor",
            DistributionLevel::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<DistributionLevel> {
        match value {
            "major" => Some(DistributionLevel::Major),
            "minor" => Some(DistributionLevel::Minor),
            "local" => Some(DistributionLevel::Local),
            _ => None,
        }
    }

    // Ordenação major < minor < local usada pelo resolvedor de escopo.
    pub fn rank(level: Option<DistributionLevel>) -> u8 {
        match level {
            Some(DistributionLevel::Major) => 1,
            Some(DistributionLevel::Minor) => 2,
            Some(DistributionLevel::Local) => 3,
            None => 9,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Region {
    pub region_id: i32,
    pub region_name: String,
    pub region_description: Option<String>,
    pub region_type: String,
    pub distribution_level: Option<String>,
    pub parent_region_id: Option<i32>,
}

impl Region {
    pub fn kind(&self) -> Option<RegionType> {
        RegionType::parse(&self.region_type)
    }

    pub fn level(&self) -> Option<DistributionLevel> {
        self.distribution_level
            .as_deref()
            .and_then(DistributionLevel::parse)
    }

    pub fn is_distribution(&self) -> bool {
        self.kind() == Some(RegionType::Distribution)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct RegionDefault {
    pub id: i32,
    pub region_id: i32,
    pub default_admin_user_id: Option<i32>,
    pub default_ambassador_user_id: Option<i32>,
}

/// Valida as regras de hierarquia antes de criar/editar uma região.
/// `parent` é a região apontada por `parent_region_id`, quando houver.
pub fn validate_hierarchy(
    region_type: RegionType,
    distribution_level: Option<DistributionLevel>,
    parent_region_id: Option<i32>,
    parent: Option<&Region>,
) -> Result<(), String> {
    if region_type == RegionType::Source {
        if distribution_level.is_some() {
            return Err("distribution_level deve ser vazio para regiões source".into());
        }
        if parent_region_id.is_some() {
            return Err("parent_region_id deve ser vazio para regiões source".into());
        }
        return Ok(());
    }

    let Some(level) = distribution_level else {
        return Err(
            "distribution_level deve ser major, minor ou local para regiões distribution".into(),
        );
    };

    if level == DistributionLevel::Major {
        if parent_region_id.is_some() {
            return Err("regiões de distribuição major não podem ter parent_region_id".into());
        }
        return Ok(());
    }

    if parent_region_id.is_none() {
        return Err("parent_region_id é obrigatório para regiões minor/local".into());
    }
    let Some(parent) = parent else {
        return Err("região pai não encontrada".into());
    };
    if !parent.is_distribution() {
        return Err("a região pai deve ser do tipo distribution".into());
    }

    match level {
        DistributionLevel::Minor => {
            if parent.level() != Some(DistributionLevel::Major) {
                return Err("o pai de uma região minor deve ser uma região major".into());
            }
        }
        DistributionLevel::Local => {
            if parent.level() != Some(DistributionLevel::Minor) {
                return Err("o pai de uma região local deve ser uma região minor".into());
            }
        }
        DistributionLevel::Major => unreachable!(),
    }

    Ok(())
}

/// Sobe até a região major ancestral (no máximo dois saltos). Retorna `None`
/// em vez de falhar quando a árvore está malformada: o cálculo de escopo
/// precisa ser total.
pub fn major_ancestor_of(
    region: &Region,
    lookup: impl Fn(i32) -> Option<Region>,
) -> Option<i32> {
    if !region.is_distribution() {
        return None;
    }
    match region.level()? {
        DistributionLevel::Major => Some(region.region_id),
        DistributionLevel::Minor => region.parent_region_id,
        DistributionLevel::Local => {
            let minor = lookup(region.parent_region_id?)?;
            minor.parent_region_id
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegionPayload {
    #[validate(length(min = 1, max = 150, message = "region_name deve ter entre 1 e 150 caracteres."))]
    pub region_name: String,

    #[validate(length(max = 1500, message = "region_description excede 1500 caracteres."))]
    pub region_description: Option<String>,

    pub region_type: RegionType,
    pub distribution_level: Option<DistributionLevel>,
    pub parent_region_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegionDefaultsPayload {
    pub default_admin_user_id: Option<i32>,
    pub default_ambassador_user_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegroupLocalPayload {
    pub major_region_id: i32,

    #[validate(length(min = 1, max = 150, message = "new_minor_name deve ter entre 1 e 150 caracteres."))]
    pub new_minor_name: String,

    #[validate(length(max = 1500, message = "new_minor_description excede 1500 caracteres."))]
    pub new_minor_description: Option<String>,

    #[validate(length(min = 1, message = "local_region_ids não pode ser vazio."))]
    pub local_region_ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    #[serde(flatten)]
    pub region: Region,
    pub default_admin_user_id: Option<i32>,
    pub default_ambassador_user_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(
        id: i32,
        region_type: &str,
        level: Option<&str>,
        parent: Option<i32>,
    ) -> Region {
        Region {
            region_id: id,
            region_name: format!("regiao-{id}"),
            region_description: None,
            region_type: region_type.to_string(),
            distribution_level: level.map(|l| l.to_string()),
            parent_region_id: parent,
        }
    }

    #[test]
    fn source_region_rejects_level_and_parent() {
        assert!(validate_hierarchy(RegionType::Source, None, None, None).is_ok());
        assert!(
            validate_hierarchy(RegionType::Source, Some(DistributionLevel::Major), None, None)
                .is_err()
        );
        assert!(validate_hierarchy(RegionType::Source, None, Some(1), None).is_err());
    }

    #[test]
    fn major_region_rejects_parent() {
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Major),
            None,
            None
        )
        .is_ok());
        let parent = region(1, "distribution", Some("major"), None);
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Major),
            Some(1),
            Some(&parent)
        )
        .is_err());
    }

    #[test]
    fn minor_region_requires_major_parent() {
        let major = region(1, "distribution", Some("major"), None);
        let local = region(3, "distribution", Some("local"), Some(2));
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Minor),
            Some(1),
            Some(&major)
        )
        .is_ok());
        // pai local é rejeitado
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Minor),
            Some(3),
            Some(&local)
        )
        .is_err());
    }

    #[test]
    fn local_region_requires_minor_parent() {
        let minor = region(2, "distribution", Some("minor"), Some(1));
        let major = region(1, "distribution", Some("major"), None);
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Local),
            Some(2),
            Some(&minor)
        )
        .is_ok());
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Local),
            Some(1),
            Some(&major)
        )
        .is_err());
        // sem pai
        assert!(validate_hierarchy(
            RegionType::Distribution,
            Some(DistributionLevel::Local),
            None,
            None
        )
        .is_err());
    }

    #[test]
    fn distribution_region_requires_level() {
        assert!(validate_hierarchy(RegionType::Distribution, None, None, None).is_err());
    }

    #[test]
    fn major_ancestor_walks_two_hops() {
        let major = region(1, "distribution", Some("major"), None);
        let minor = region(2, "distribution", Some("minor"), Some(1));
        let local = region(3, "distribution", Some("local"), Some(2));
        let lookup = |id: i32| match id {
            1 => Some(major.clone()),
            2 => Some(minor.clone()),
            3 => Some(local.clone()),
            _ => None,
        };

        assert_eq!(major_ancestor_of(&major, lookup), Some(1));
        assert_eq!(major_ancestor_of(&minor, lookup), Some(1));
        assert_eq!(major_ancestor_of(&local, lookup), Some(1));
    }

    #[test]
    fn major_ancestor_is_total_on_malformed_branches() {
        // local cujo minor aponta para lugar nenhum
        let orphan_minor = region(2, "distribution", Some("minor"), None);
        let local = region(3, "distribution", Some("local"), Some(2));
        let lookup = |id: i32| match id {
            2 => Some(orphan_minor.clone()),
            _ => None,
        };
        assert_eq!(major_ancestor_of(&local, lookup), None);

        let source = region(9, "source", None, None);
        assert_eq!(major_ancestor_of(&source, |_| None), None);
    }
}
