use artifact_defence_core::{
    AttackType, CellCoord, Element, GridConfig, PieceKind, Role, Shape, TemplateId, Tower,
    TowerId, TowerStats, TowerTemplate,
};
use artifact_defence_system_synergy::SynergyEngine;
use proptest::prelude::*;

fn artifact(id: &str, element: Element, role: Role) -> TowerTemplate {
    TowerTemplate {
        id: TemplateId::new(id),
        name: id.to_owned(),
        kind: PieceKind::Artifact,
        element: Some(element),
        role: Some(role),
        shape: Shape::rect(1, 1),
        stats: TowerStats {
            atk: 50.0,
            range: 300.0,
            fire_rate: 1_000.0,
            attack_type: AttackType::Normal,
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
fn adjacent_fire_pair_activates_fire_power_once() {
    let mut towers = vec![
        place(0, artifact("ember", Element::Fire, Role::Sniper), 0, 0),
        place(1, artifact("ember", Element::Fire, Role::Support), 1, 0),
    ];
    let mut engine = SynergyEngine::default();

    let report = engine.recompute(towers.iter_mut());

    for tower in &towers {
        assert!((tower.runtime.atk - 60.0).abs() < 1e-9, "atk must be base x 1.2");
        assert!(tower.runtime.is_synergetic);
        assert_eq!(tower.runtime.active_synergy.as_deref(), Some("Blazing Synergy"));
    }
    assert_eq!(report.active_combos, vec!["Blazing Synergy".to_owned()]);
}

#[test]
fn group_below_requirement_stays_inactive() {
    let mut towers = vec![
        place(0, artifact("ember", Element::Fire, Role::Sniper), 0, 0),
        place(1, artifact("frost", Element::Ice, Role::Support), 1, 0),
    ];
    let report = SynergyEngine::default().recompute(towers.iter_mut());

    assert!(report.active_combos.is_empty());
    assert!(towers.iter().all(|tower| !tower.runtime.is_synergetic));
    assert_eq!(towers[0].runtime.atk, 50.0);
}

#[test]
fn removing_a_bridge_splits_the_component() {
    let line = |with_bridge: bool| {
        let mut towers = vec![
            place(0, artifact("ember", Element::Fire, Role::Sniper), 0, 0),
            place(2, artifact("ember", Element::Fire, Role::Support), 2, 0),
        ];
        if with_bridge {
            towers.push(place(1, artifact("ember", Element::Fire, Role::Artillery), 1, 0));
        }
        towers
    };

    let mut bridged = line(true);
    let mut engine = SynergyEngine::default();
    let report = engine.recompute(bridged.iter_mut());
    assert_eq!(report.active_combos, vec!["Blazing Synergy".to_owned()]);
    assert!(bridged.iter().all(|tower| tower.runtime.is_synergetic));

    let mut split = line(false);
    let report = engine.recompute(split.iter_mut());
    assert!(report.active_combos.is_empty(), "isolated singles cannot meet req 2");
    assert!(split.iter().all(|tower| (tower.runtime.atk - 50.0).abs() < 1e-9));
}

#[test]
fn element_synergy_name_overrides_role_synergy_name() {
    let mut towers = vec![
        place(0, artifact("scope", Element::Gem, Role::Sniper), 0, 0),
        place(1, artifact("scope", Element::Gem, Role::Sniper), 0, 1),
    ];
    let report = SynergyEngine::default().recompute(towers.iter_mut());

    assert_eq!(
        report.active_combos,
        vec!["Gem Synergy".to_owned(), "Sniper Formation".to_owned()]
    );
    for tower in &towers {
        assert_eq!(tower.runtime.active_synergy.as_deref(), Some("Gem Synergy"));
        assert!((tower.runtime.crit_chance - 0.2).abs() < 1e-9);
        assert!((tower.runtime.range - 400.0).abs() < 1e-9);
    }
}

#[test]
fn polyomino_contact_counts_as_adjacency() {
    let rows: [&[u8]; 2] = [&[1, 0], &[1, 1]];
    let mut corner = artifact("corner", Element::Shadow, Role::Assault);
    corner.shape = Shape::from_rows(&rows).expect("valid shape");
    let mut towers = vec![
        place(0, corner, 0, 0),
        place(1, artifact("blade", Element::Shadow, Role::Sniper), 2, 1),
    ];
    let _ = SynergyEngine::default().recompute(towers.iter_mut());

    assert!(towers.iter().all(|tower| tower.runtime.execute_threshold == 0.3));
}

proptest! {
    #[test]
    fn recompute_is_idempotent(cells in proptest::collection::btree_set((0u32..5, 0u32..5), 1..12)) {
        let elements = [Element::Fire, Element::Thunder, Element::Leaf, Element::Mystic];
        let roles = [Role::Sniper, Role::Assault, Role::Support];
        let mut towers: Vec<Tower> = cells
            .iter()
            .enumerate()
            .map(|(index, (column, row))| {
                let template = artifact(
                    "generated",
                    elements[index % elements.len()],
                    roles[index % roles.len()],
                );
                place(index as u32, template, *column, *row)
            })
            .collect();
        let mut engine = SynergyEngine::default();

        let first_report = engine.recompute(towers.iter_mut());
        let first: Vec<_> = towers.iter().map(|tower| tower.runtime.clone()).collect();
        let second_report = engine.recompute(towers.iter_mut());
        let second: Vec<_> = towers.iter().map(|tower| tower.runtime.clone()).collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_report, second_report);
    }
}
