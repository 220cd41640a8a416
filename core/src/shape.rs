//! Polyomino shapes and the grid footprints they cover once placed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CellCoord;

/// Errors raised while building a [`Shape`] from a row matrix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The matrix contained no rows or an empty first row.
    #[error("shape matrix must contain at least one row and one column")]
    Empty,
    /// A row had a different length from the first row.
    #[error("shape row {row} has {found} columns, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        found: usize,
    },
    /// No cell of the matrix was filled.
    #[error("shape matrix must contain at least one filled cell")]
    NoFilledCells,
}

/// Rectangular boolean matrix describing which cells of a bounding box a
/// piece occupies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Shape {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Shape {
    /// Builds a shape from row-major rows where non-zero entries are filled.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let expected = rows.first().map_or(0, |row| row.as_ref().len());
        if expected == 0 {
            return Err(ShapeError::Empty);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != expected {
                return Err(ShapeError::Ragged {
                    row: index,
                    expected,
                    found: row.len(),
                });
            }
            cells.extend(row.iter().map(|value| *value != 0));
        }

        if !cells.iter().any(|filled| *filled) {
            return Err(ShapeError::NoFilledCells);
        }

        Ok(Self {
            width: expected as u32,
            height: rows.len() as u32,
            cells,
        })
    }

    /// Builds a fully filled rectangle; zero dimensions are raised to one.
    #[must_use]
    pub fn rect(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![true; (width * height) as usize],
        }
    }

    /// Width of the bounding box in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the bounding box in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the cell at the provided bounding-box offset is filled.
    #[must_use]
    pub fn is_filled(&self, column: u32, row: u32) -> bool {
        if column >= self.width || row >= self.height {
            return false;
        }
        self.cells[(row * self.width + column) as usize]
    }

    /// Number of filled cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|filled| **filled).count()
    }

    /// Offsets of every filled cell relative to the bounding-box origin.
    pub fn offsets(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width)
                .filter(move |column| self.is_filled(*column, row))
                .map(move |column| (column, row))
        })
    }

    /// Returns the shape rotated a quarter turn clockwise.
    #[must_use]
    pub fn rotated_clockwise(&self) -> Self {
        let width = self.height;
        let height = self.width;
        let mut cells = vec![false; self.cells.len()];
        for row in 0..height {
            for column in 0..width {
                let source_column = row;
                let source_row = self.height - 1 - column;
                cells[(row * width + column) as usize] =
                    self.is_filled(source_column, source_row);
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Projects the shape onto the grid with its bounding box at `origin`.
    ///
    /// Coordinates saturate at `u32::MAX`; use [`Shape::checked_footprint`]
    /// for origins that have not been validated against the board.
    #[must_use]
    pub fn footprint(&self, origin: CellCoord) -> Footprint {
        let cells = self
            .offsets()
            .map(|(column, row)| {
                CellCoord::new(
                    origin.column().saturating_add(column),
                    origin.row().saturating_add(row),
                )
            })
            .collect();
        Footprint { cells }
    }

    /// Projects the shape like [`Shape::footprint`], returning `None` when a
    /// covered cell lies beyond the coordinate range.
    #[must_use]
    pub fn checked_footprint(&self, origin: CellCoord) -> Option<Footprint> {
        let cells = self
            .offsets()
            .map(|(column, row)| {
                Some(CellCoord::new(
                    origin.column().checked_add(column)?,
                    origin.row().checked_add(row)?,
                ))
            })
            .collect::<Option<BTreeSet<_>>>()?;
        Some(Footprint { cells })
    }
}

impl TryFrom<Vec<Vec<u8>>> for Shape {
    type Error = ShapeError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Shape> for Vec<Vec<u8>> {
    fn from(shape: Shape) -> Self {
        (0..shape.height)
            .map(|row| {
                (0..shape.width)
                    .map(|column| u8::from(shape.is_filled(column, row)))
                    .collect()
            })
            .collect()
    }
}

/// Set of grid cells covered by a placed piece.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Footprint {
    cells: BTreeSet<CellCoord>,
}

impl Footprint {
    /// Iterates the covered cells in row-major order of their coordinates.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Number of covered cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the footprint covers no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the footprint covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Two footprints are adjacent when some pair of their cells lies at
    /// Manhattan distance exactly one.
    #[must_use]
    pub fn is_adjacent_to(&self, other: &Footprint) -> bool {
        self.cells
            .iter()
            .flat_map(|cell| neighbours(*cell))
            .any(|neighbour| other.cells.contains(&neighbour))
    }
}

fn neighbours(cell: CellCoord) -> impl Iterator<Item = CellCoord> {
    const OFFSETS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let column = u32::try_from(i64::from(cell.column()) + dx).ok()?;
        let row = u32::try_from(i64::from(cell.row()) + dy).ok()?;
        Some(CellCoord::new(column, row))
    })
}
