#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that rebuilds every placed piece's effective stats from its
//! template, adjacent tablets and connected synergy groups.

use std::collections::VecDeque;

use artifact_defence_core::{
    default_synergies, BuffKind, SynergyDefinition, SynergyEffect, SynergyKey, TabletBuff, Tower,
    TowerRuntime,
};

/// Outcome of a synergy pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SynergyReport {
    /// Names of the synergies active anywhere on the board, each listed once.
    pub active_combos: Vec<String>,
}

/// Synergy engine holding the definition table.
#[derive(Debug)]
pub struct SynergyEngine {
    definitions: Vec<SynergyDefinition>,
    adjacency: Vec<Vec<usize>>,
}

impl Default for SynergyEngine {
    fn default() -> Self {
        Self::new(default_synergies())
    }
}

impl SynergyEngine {
    /// Creates an engine that evaluates the provided definitions in order.
    #[must_use]
    pub fn new(definitions: Vec<SynergyDefinition>) -> Self {
        Self {
            definitions,
            adjacency: Vec::new(),
        }
    }

    /// Definitions evaluated by the engine.
    #[must_use]
    pub fn definitions(&self) -> &[SynergyDefinition] {
        &self.definitions
    }

    /// Recomputes the runtime stats of every piece from scratch.
    ///
    /// The pass resets each piece to its base stats, applies tablet buffs to
    /// adjacent artifacts and finally applies the effect of every synergy
    /// whose connected group of matching artifacts is large enough.
    pub fn recompute<'a, I>(&mut self, towers: I) -> SynergyReport
    where
        I: IntoIterator<Item = &'a mut Tower>,
    {
        let mut towers: Vec<&'a mut Tower> = towers.into_iter().collect();

        for tower in towers.iter_mut() {
            tower.runtime = TowerRuntime::from_stats(tower.stats());
        }

        self.rebuild_adjacency(&towers);
        self.apply_tablets(&mut towers);

        let mut report = SynergyReport::default();
        for definition in &self.definitions {
            let mut visited = vec![false; towers.len()];
            for start in 0..towers.len() {
                if visited[start] || !matches_key(&towers[start], definition.key) {
                    continue;
                }

                let component = self.component(&towers, start, definition.key, &mut visited);
                if component.len() < definition.req {
                    continue;
                }

                for &index in &component {
                    apply_definition(&mut towers[index].runtime, definition);
                }

                if !report.active_combos.contains(&definition.name) {
                    tracing::debug!(
                        synergy = %definition.id,
                        members = component.len(),
                        "synergy activated"
                    );
                    report.active_combos.push(definition.name.clone());
                }
            }
        }

        report
    }

    fn rebuild_adjacency(&mut self, towers: &[&mut Tower]) {
        self.adjacency.clear();
        self.adjacency.resize_with(towers.len(), Vec::new);
        for first in 0..towers.len() {
            for second in (first + 1)..towers.len() {
                if towers[first]
                    .footprint()
                    .is_adjacent_to(towers[second].footprint())
                {
                    self.adjacency[first].push(second);
                    self.adjacency[second].push(first);
                }
            }
        }
    }

    fn apply_tablets(&self, towers: &mut [&mut Tower]) {
        for index in 0..towers.len() {
            let buff = match towers[index].template().buff {
                Some(buff) if !towers[index].is_artifact() => buff,
                _ => continue,
            };
            for &neighbour in &self.adjacency[index] {
                if towers[neighbour].is_artifact() {
                    apply_buff(&mut towers[neighbour].runtime, buff);
                }
            }
        }
    }

    fn component(
        &self,
        towers: &[&mut Tower],
        start: usize,
        key: SynergyKey,
        visited: &mut [bool],
    ) -> Vec<usize> {
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(index) = queue.pop_front() {
            component.push(index);
            for &neighbour in &self.adjacency[index] {
                if !visited[neighbour] && matches_key(&towers[neighbour], key) {
                    visited[neighbour] = true;
                    queue.push_back(neighbour);
                }
            }
        }

        component
    }
}

fn matches_key(tower: &Tower, key: SynergyKey) -> bool {
    if !tower.is_artifact() {
        return false;
    }
    let template = tower.template();
    match key {
        SynergyKey::Element(element) => template.element == Some(element),
        SynergyKey::Role(role) => template.role == Some(role),
    }
}

fn apply_buff(runtime: &mut TowerRuntime, buff: TabletBuff) {
    let ratio = buff.val / 100.0;
    match buff.kind {
        BuffKind::Atk => runtime.atk *= 1.0 + ratio,
        BuffKind::Range => runtime.range *= 1.0 + ratio,
        BuffKind::Focus => {
            runtime.atk *= 1.0 + ratio;
            runtime.range *= 1.0 - buff.penalty / 100.0;
        }
        BuffKind::Speed => runtime.fire_rate *= 1.0 - ratio,
        BuffKind::Crit => runtime.crit_chance += ratio,
        BuffKind::Area => runtime.aoe_mult *= 1.0 + ratio,
    }
}

fn apply_definition(runtime: &mut TowerRuntime, definition: &SynergyDefinition) {
    runtime.is_synergetic = true;
    if runtime.active_synergy.is_none() || definition.is_element() {
        runtime.active_synergy = Some(definition.name.clone());
    }

    match definition.effect {
        SynergyEffect::AtkMult(factor) => runtime.atk *= factor,
        SynergyEffect::FireRateMult(factor) => runtime.fire_rate *= factor,
        SynergyEffect::RangeMult(factor) => runtime.range *= factor,
        SynergyEffect::CritAdd(amount) => runtime.crit_chance += amount,
        SynergyEffect::ExecuteThreshold(threshold) => runtime.execute_threshold = threshold,
        SynergyEffect::AoeMult(factor) => runtime.aoe_mult *= factor,
        SynergyEffect::PierceAdd(count) => runtime.pierce_count += count,
        SynergyEffect::DebuffEfficiencyMult(factor) => runtime.debuff_efficiency *= factor,
        SynergyEffect::RangeAndCritAdd { range, crit } => {
            runtime.range += range;
            runtime.crit_chance += crit;
        }
        SynergyEffect::DebuffDurationMult(factor) => runtime.debuff_duration_mult = factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_defence_core::{
        CellCoord, GridConfig, PieceKind, Shape, TemplateId, TowerId, TowerStats, TowerTemplate,
    };

    fn tablet(kind: BuffKind, val: f64, penalty: f64) -> TowerTemplate {
        TowerTemplate {
            id: TemplateId::new("tablet"),
            name: "Tablet".to_owned(),
            kind: PieceKind::Tablet,
            element: None,
            role: None,
            shape: Shape::rect(1, 1),
            stats: TowerStats::default(),
            buff: Some(TabletBuff { kind, val, penalty }),
        }
    }

    fn plain_artifact() -> TowerTemplate {
        TowerTemplate {
            id: TemplateId::new("plain"),
            name: "Plain".to_owned(),
            kind: PieceKind::Artifact,
            element: None,
            role: None,
            shape: Shape::rect(1, 1),
            stats: TowerStats {
                atk: 100.0,
                range: 200.0,
                fire_rate: 1_000.0,
                ..TowerStats::default()
            },
            buff: None,
        }
    }

    fn place(id: u32, template: TowerTemplate, column: u32, row: u32) -> Tower {
        Tower::new(
            TowerId::new(id),
            template,
            CellCoord::new(column, row),
            &GridConfig::default(),
        )
    }

    #[test]
    fn focus_tablet_trades_range_for_attack() {
        let mut towers = vec![
            place(0, plain_artifact(), 0, 0),
            place(1, tablet(BuffKind::Focus, 30.0, 20.0), 1, 0),
        ];
        let _ = SynergyEngine::default().recompute(towers.iter_mut());

        assert!((towers[0].runtime.atk - 130.0).abs() < 1e-9);
        assert!((towers[0].runtime.range - 160.0).abs() < 1e-9);
        assert!(!towers[0].runtime.is_synergetic);
    }

    #[test]
    fn tablets_ignore_diagonal_and_tablet_neighbours() {
        let mut towers = vec![
            place(0, plain_artifact(), 0, 0),
            place(1, tablet(BuffKind::Speed, 20.0, 0.0), 1, 1),
            place(2, tablet(BuffKind::Atk, 15.0, 0.0), 2, 1),
        ];
        let _ = SynergyEngine::default().recompute(towers.iter_mut());

        assert_eq!(towers[0].runtime.fire_rate, 1_000.0);
        assert_eq!(towers[0].runtime.atk, 100.0);
        assert_eq!(towers[1].runtime, TowerRuntime::from_stats(towers[1].stats()));
    }

    #[test]
    fn stacked_tablets_each_apply() {
        let mut towers = vec![
            place(0, plain_artifact(), 1, 1),
            place(1, tablet(BuffKind::Crit, 15.0, 0.0), 0, 1),
            place(2, tablet(BuffKind::Crit, 15.0, 0.0), 2, 1),
            place(3, tablet(BuffKind::Area, 30.0, 0.0), 1, 0),
        ];
        let _ = SynergyEngine::default().recompute(towers.iter_mut());

        assert!((towers[0].runtime.crit_chance - 0.3).abs() < 1e-9);
        assert!((towers[0].runtime.aoe_mult - 1.3).abs() < 1e-9);
    }
}
