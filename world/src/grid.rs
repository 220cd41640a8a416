//! Dense occupancy grid mapping each cell to the piece covering it.

use artifact_defence_core::{CellCoord, Footprint, PlacementError, Shape, TowerId};

#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<TowerId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    /// Checks that every cell of the footprint lies on the board and is
    /// free, treating cells held by `ignore` as free.
    pub(crate) fn can_place(
        &self,
        footprint: &Footprint,
        ignore: Option<TowerId>,
    ) -> Result<(), PlacementError> {
        for cell in footprint.cells() {
            let Some(index) = self.index(cell) else {
                return Err(PlacementError::OutOfBounds);
            };
            match self.cells.get(index).copied().flatten() {
                Some(occupant) if Some(occupant) != ignore => {
                    return Err(PlacementError::Occupied);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Checks a shape placed with its bounding box at `origin`. Origins whose
    /// cells overflow the coordinate range are out of bounds.
    pub(crate) fn can_place_shape(
        &self,
        shape: &Shape,
        origin: CellCoord,
        ignore: Option<TowerId>,
    ) -> Result<(), PlacementError> {
        let footprint = shape
            .checked_footprint(origin)
            .ok_or(PlacementError::OutOfBounds)?;
        self.can_place(&footprint, ignore)
    }

    pub(crate) fn occupy(&mut self, tower: TowerId, footprint: &Footprint) {
        for cell in footprint.cells() {
            if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
                *slot = Some(tower);
            }
        }
    }

    pub(crate) fn vacate(&mut self, footprint: &Footprint) {
        for cell in footprint.cells() {
            if let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) {
                *slot = None;
            }
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<TowerId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
