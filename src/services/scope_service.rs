// src/services/scope_service.rs
//
// Resolvedor de escopo dos embaixadores: dado o grafo de regiões de
// distribuição, os responsáveis padrão e as arestas embaixador-comprador,
// calcula que usuários um embaixador enxerga. O cálculo é uma função
// pura sobre um snapshot carregado de uma vez; nunca falha por árvore
// malformada, apenas encolhe o resultado.

use std::collections::{HashMap, HashSet};

use crate::{
    common::error::AppError,
    db::{RegionRepository, UserRepository},
    models::{
        auth::{ActorContext, Role},
        region::{DistributionLevel, Region, major_ancestor_of},
    },
};

/// Fotografia do grafo de regiões e vínculos usada pelo resolvedor.
#[derive(Debug, Default, Clone)]
pub struct ScopeSnapshot {
    pub regions: HashMap<i32, Region>,
    /// region_id -> embaixador padrão.
    pub default_ambassadors: HashMap<i32, i32>,
    /// (buyer_id, major_distribution_region_id) de cada comprador.
    pub buyers: Vec<(i32, Option<i32>)>,
    /// Arestas explícitas (ambassador_user_id, buyer_user_id).
    pub assignments: Vec<(i32, i32)>,
}

impl ScopeSnapshot {
    fn lookup(&self, region_id: i32) -> Option<Region> {
        self.regions.get(&region_id).cloned()
    }

    /// Regiões de distribuição cujo embaixador padrão é o usuário dado,
    /// ordenadas do nível mais alto para o mais baixo.
    pub fn owned_regions(&self, ambassador_user_id: i32) -> Vec<&Region> {
        let mut owned: Vec<&Region> = self
            .default_ambassadors
            .iter()
            .filter(|&(_, &user_id)| user_id == ambassador_user_id)
            .filter_map(|(&region_id, _)| self.regions.get(&region_id))
            .filter(|region| region.is_distribution())
            .collect();
        owned.sort_by_key(|r| (DistributionLevel::rank(r.level()), r.region_id));
        owned
    }

    fn minors_under(&self, major_region_id: i32) -> Vec<&Region> {
        self.regions
            .values()
            .filter(|r| r.level() == Some(DistributionLevel::Minor))
            .filter(|r| r.parent_region_id == Some(major_region_id))
            .collect()
    }

    fn locals_under(&self, minor_region_id: i32) -> Vec<&Region> {
        self.regions
            .values()
            .filter(|r| r.level() == Some(DistributionLevel::Local))
            .filter(|r| r.parent_region_id == Some(minor_region_id))
            .collect()
    }

    fn buyers_of_major(&self, major_region_id: i32) -> HashSet<i32> {
        self.buyers
            .iter()
            .filter(|(_, major)| *major == Some(major_region_id))
            .map(|(buyer_id, _)| *buyer_id)
            .collect()
    }

    fn assigned_buyers_of(&self, ambassador_user_id: i32) -> HashSet<i32> {
        self.assignments
            .iter()
            .filter(|(ambassador, _)| *ambassador == ambassador_user_id)
            .map(|(_, buyer)| *buyer)
            .collect()
    }
}

/// Escopo de uma única região de posse do embaixador. Retorna os
/// conjuntos (embaixadores visíveis, compradores visíveis).
pub fn scope_for_region(
    snapshot: &ScopeSnapshot,
    region: &Region,
    ambassador_user_id: i32,
) -> (HashSet<i32>, HashSet<i32>) {
    match region.level() {
        // Major: a subárvore inteira. Embaixadores padrão da própria
        // major, das minors e das locals; compradores ancorados na major.
        Some(DistributionLevel::Major) => {
            let mut ambassadors = HashSet::new();
            if let Some(&a) = snapshot.default_ambassadors.get(&region.region_id) {
                ambassadors.insert(a);
            }
            for minor in snapshot.minors_under(region.region_id) {
                if let Some(&a) = snapshot.default_ambassadors.get(&minor.region_id) {
                    ambassadors.insert(a);
                }
                for local in snapshot.locals_under(minor.region_id) {
                    if let Some(&a) = snapshot.default_ambassadors.get(&local.region_id) {
                        ambassadors.insert(a);
                    }
                }
            }
            let buyers = snapshot.buyers_of_major(region.region_id);
            (ambassadors, buyers)
        }

        // Minor: os embaixadores das locals filhas, e os compradores da
        // major ancestral que ainda não foram capturados por nenhuma
        // dessas locals.
        Some(DistributionLevel::Minor) => {
            let Some(major_id) = major_ancestor_of(region, |id| snapshot.lookup(id)) else {
                return (HashSet::new(), HashSet::new());
            };

            let mut ambassadors = HashSet::new();
            let mut captured = HashSet::new();
            for local in snapshot.locals_under(region.region_id) {
                if let Some(&a) = snapshot.default_ambassadors.get(&local.region_id) {
                    ambassadors.insert(a);
                    captured.extend(snapshot.assigned_buyers_of(a));
                }
            }

            let buyers = snapshot
                .buyers_of_major(major_id)
                .difference(&captured)
                .copied()
                .collect();
            (ambassadors, buyers)
        }

        // Local: o próprio embaixador e os compradores explicitamente
        // atribuídos a ele.
        Some(DistributionLevel::Local) => {
            let ambassadors = HashSet::from([ambassador_user_id]);
            if major_ancestor_of(region, |id| snapshot.lookup(id)).is_none() {
                return (ambassadors, HashSet::new());
            }
            let buyers = snapshot.assigned_buyers_of(ambassador_user_id);
            (ambassadors, buyers)
        }

        None => (HashSet::new(), HashSet::new()),
    }
}

/// União do escopo de todas as regiões de posse do embaixador. O piso é
/// `{o próprio usuário}`: ele só entra no conjunto quando nenhuma região
/// de posse contribuiu com embaixador algum.
pub fn resolve_group_scope(
    snapshot: &ScopeSnapshot,
    ambassador_user_id: i32,
) -> (HashSet<i32>, HashSet<i32>) {
    let mut ambassadors = HashSet::new();
    let mut buyers = HashSet::new();

    for region in snapshot.owned_regions(ambassador_user_id) {
        let (a, b) = scope_for_region(snapshot, region, ambassador_user_id);
        ambassadors.extend(a);
        buyers.extend(b);
    }

    if ambassadors.is_empty() {
        ambassadors.insert(ambassador_user_id);
    }
    (ambassadors, buyers)
}

/// Recorte de visibilidade já resolvido para o chamador.
#[derive(Debug, Clone)]
pub enum GroupScope {
    /// Admin e super_admin enxergam tudo.
    All,
    /// Embaixador: conjuntos explícitos de usuários visíveis.
    Restricted {
        ambassador_ids: HashSet<i32>,
        buyer_ids: HashSet<i32>,
    },
}

impl GroupScope {
    pub fn can_see_buyer(&self, buyer_id: i32) -> bool {
        match self {
            GroupScope::All => true,
            GroupScope::Restricted { buyer_ids, .. } => buyer_ids.contains(&buyer_id),
        }
    }
}

#[derive(Clone)]
pub struct ScopeService {
    user_repo: UserRepository,
    region_repo: RegionRepository,
}

impl ScopeService {
    pub fn new(user_repo: UserRepository, region_repo: RegionRepository) -> Self {
        Self { user_repo, region_repo }
    }

    pub async fn load_snapshot(&self) -> Result<ScopeSnapshot, AppError> {
        let regions = self
            .region_repo
            .list_distribution()
            .await?
            .into_iter()
            .map(|r| (r.region_id, r))
            .collect();

        let default_ambassadors = self
            .region_repo
            .list_defaults()
            .await?
            .into_iter()
            .filter_map(|d| Some((d.region_id, d.default_ambassador_user_id?)))
            .collect();

        let buyers = self.user_repo.buyer_regions().await?;
        let assignments = self.user_repo.all_assignments().await?;

        Ok(ScopeSnapshot { regions, default_ambassadors, buyers, assignments })
    }

    /// Resolve o recorte de visibilidade do chamador. Admins enxergam
    /// tudo; embaixadores enxergam o próprio grupo; o resto é proibido.
    pub async fn group_scope(&self, actor: &ActorContext) -> Result<GroupScope, AppError> {
        if actor.is_admin_like() {
            return Ok(GroupScope::All);
        }
        if !actor.has_role(Role::Ambassador) {
            return Err(AppError::forbidden(
                "apenas admins e embaixadores consultam grupos de compradores",
            ));
        }

        let snapshot = self.load_snapshot().await?;
        let (ambassador_ids, buyer_ids) = resolve_group_scope(&snapshot, actor.user_id);
        Ok(GroupScope::Restricted { ambassador_ids, buyer_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: i32, level: &str, parent: Option<i32>) -> Region {
        Region {
            region_id: id,
            region_name: format!("regiao-{id}"),
            region_description: None,
            region_type: "distribution".to_string(),
            distribution_level: Some(level.to_string()),
            parent_region_id: parent,
        }
    }

    // Major J(1) <- Minor M(2) <- Locals L1(3), L2(4).
    // Embaixadores padrão: X na minor, A1 na L1, A2 na L2.
    // Compradores B1(101), B2(102), B3(103) ancorados na major J.
    // A1 tem B1 explicitamente atribuído.
    fn sample_snapshot() -> ScopeSnapshot {
        let regions = [
            region(1, "major", None),
            region(2, "minor", Some(1)),
            region(3, "local", Some(2)),
            region(4, "local", Some(2)),
        ]
        .into_iter()
        .map(|r| (r.region_id, r))
        .collect();

        ScopeSnapshot {
            regions,
            default_ambassadors: HashMap::from([(2, 10), (3, 11), (4, 12)]),
            buyers: vec![(101, Some(1)), (102, Some(1)), (103, Some(1))],
            assignments: vec![(11, 101)],
        }
    }

    #[test]
    fn minor_owner_sees_local_ambassadors_and_uncaptured_buyers() {
        let snapshot = sample_snapshot();
        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 10);

        // X vê exatamente os embaixadores das locals; ele próprio não
        // entra quando o conjunto resolvido não está vazio
        assert_eq!(ambassadors, HashSet::from([11, 12]));
        // B1 foi capturado por A1, então sobra B2 e B3
        assert_eq!(buyers, HashSet::from([102, 103]));
    }

    #[test]
    fn minor_owner_without_local_defaults_falls_back_to_himself() {
        let mut snapshot = sample_snapshot();
        // as locals existem, mas nenhuma tem embaixador padrão
        snapshot.default_ambassadors.remove(&3);
        snapshot.default_ambassadors.remove(&4);

        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 10);
        assert_eq!(ambassadors, HashSet::from([10]));
        // sem locals ativas, nenhum comprador foi capturado
        assert_eq!(buyers, HashSet::from([101, 102, 103]));
    }

    #[test]
    fn major_owner_sees_whole_subtree() {
        let mut snapshot = sample_snapshot();
        snapshot.default_ambassadors.insert(1, 9);

        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 9);
        assert_eq!(ambassadors, HashSet::from([9, 10, 11, 12]));
        assert_eq!(buyers, HashSet::from([101, 102, 103]));
    }

    #[test]
    fn local_owner_sees_only_assigned_buyers() {
        let snapshot = sample_snapshot();
        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 11);

        assert_eq!(ambassadors, HashSet::from([11]));
        assert_eq!(buyers, HashSet::from([101]));
    }

    #[test]
    fn ambassador_without_regions_sees_only_himself() {
        let snapshot = sample_snapshot();
        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 99);

        assert_eq!(ambassadors, HashSet::from([99]));
        assert!(buyers.is_empty());
    }

    #[test]
    fn malformed_minor_resolves_to_empty_sets() {
        // minor órfã: sem pai, a major ancestral não existe
        let regions = [region(2, "minor", None), region(3, "local", Some(2))]
            .into_iter()
            .map(|r| (r.region_id, r))
            .collect();
        let snapshot = ScopeSnapshot {
            regions,
            default_ambassadors: HashMap::from([(2, 10), (3, 11)]),
            buyers: vec![(101, Some(1))],
            assignments: vec![(11, 101)],
        };

        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 10);
        // só o piso: o próprio usuário
        assert_eq!(ambassadors, HashSet::from([10]));
        assert!(buyers.is_empty());
    }

    #[test]
    fn malformed_local_still_sees_himself_but_no_buyers() {
        // local cujo minor pai não existe
        let regions = [region(3, "local", Some(2))]
            .into_iter()
            .map(|r| (r.region_id, r))
            .collect();
        let snapshot = ScopeSnapshot {
            regions,
            default_ambassadors: HashMap::from([(3, 11)]),
            buyers: vec![(101, Some(1))],
            assignments: vec![(11, 101)],
        };

        let (ambassadors, buyers) = resolve_group_scope(&snapshot, 11);
        assert_eq!(ambassadors, HashSet::from([11]));
        assert!(buyers.is_empty());
    }

    #[test]
    fn owned_regions_are_ordered_by_level() {
        let mut snapshot = sample_snapshot();
        // o mesmo usuário como padrão de uma local e de uma major
        snapshot.default_ambassadors.insert(1, 10);
        snapshot.default_ambassadors.insert(4, 10);

        let owned: Vec<i32> = snapshot.owned_regions(10).iter().map(|r| r.region_id).collect();
        assert_eq!(owned, vec![1, 2, 4]);
    }
}
