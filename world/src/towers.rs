//! Authoritative piece storage and identifier allocation.

use std::collections::BTreeMap;

use artifact_defence_core::{Tower, TowerId};

/// Registry that stores pieces and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Reserves the next identifier. Identifiers are never reused.
    pub(crate) fn allocate(&mut self) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        id
    }

    pub(crate) fn insert(&mut self, tower: Tower) {
        let _ = self.entries.insert(tower.id(), tower);
    }

    pub(crate) fn remove(&mut self, tower: TowerId) -> Option<Tower> {
        self.entries.remove(&tower)
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&Tower> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> + '_ {
        self.entries.values_mut()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<TowerId, Tower> {
        &mut self.entries
    }
}
