// The cell grid: a dense row-major array of optional unit references.
//
// Each cell holds at most one `UnitRef`. Writing a reference through `set`
// is validated against the `World`: the handle must resolve to a live unit
// whose recorded position is exactly that cell, which keeps the cell/unit
// position invariant checkable at every write. Clearing a cell is always
// allowed.
//
// `PRICE_PER_MOVE` is the occupancy cost charged to a unit entering a cell.
// The grid only publishes it; movers deduct it (see `agents.rs`).
//
// See also: `world.rs` (the registry consulted by `set`), `visibility.rs`
// (neighborhood queries over the grid).

use crate::error::{Result, SimError};
use crate::types::{CellTag, Position, UnitRef};
use crate::world::World;

/// Resource cost of entering any cell.
pub const PRICE_PER_MOVE: i64 = 5;

/// Rectangular grid of cells, `rows x cols`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cells: Vec<Option<UnitRef>>,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Result<usize> {
        if !self.contains(pos) {
            return Err(SimError::OutOfBounds {
                pos,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    /// The occupant of `pos`, if any.
    pub fn get(&self, pos: Position) -> Result<Option<UnitRef>> {
        let index = self.index(pos)?;
        Ok(self.cells[index])
    }

    /// Store `occupant` in `pos`.
    ///
    /// A `Some` occupant must be registered in `world` with its position
    /// already set to `pos`; anything else is `InvalidUnitAssignment`.
    pub fn set(&mut self, pos: Position, occupant: Option<UnitRef>, world: &World) -> Result<()> {
        let index = self.index(pos)?;
        let misplaced = occupant.filter(|&unit| world.position_of(unit) != Some(pos));
        if let Some(unit) = misplaced {
            return Err(SimError::InvalidUnitAssignment { pos, unit });
        }
        self.cells[index] = occupant;
        Ok(())
    }

    /// Empty a cell. Out-of-bounds positions are ignored.
    pub(crate) fn vacate(&mut self, pos: Position) {
        if let Ok(index) = self.index(pos) {
            self.cells[index] = None;
        }
    }

    /// True when `pos` is inside the grid and holds no unit.
    pub fn is_vacant(&self, pos: Position) -> bool {
        matches!(self.get(pos), Ok(None))
    }

    pub fn cell_tag(&self, pos: Position) -> Result<CellTag> {
        self.get(pos).map(CellTag::from)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Empty positions in row-major order.
    pub fn free_positions(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.is_vacant(pos)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(3, 4);
        assert_eq!(grid.size(), 12);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.free_positions().len(), 12);
        assert_eq!(grid.get(Position::new(2, 3)), Ok(None));
    }

    #[test]
    fn out_of_bounds_reads_fail() {
        let grid = Grid::new(3, 4);
        assert_eq!(
            grid.get(Position::new(3, 0)),
            Err(SimError::OutOfBounds {
                pos: Position::new(3, 0),
                rows: 3,
                cols: 4,
            })
        );
        assert!(!grid.is_vacant(Position::new(0, 4)));
    }

    #[test]
    fn set_accepts_a_registered_unit_at_its_position() {
        let mut world = World::new();
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(1, 2);
        let id = world.register_client(pos, 25);
        grid.set(pos, Some(UnitRef::Client(id)), &world).unwrap();
        assert_eq!(grid.cell_tag(pos), Ok(CellTag::Client));
        assert_eq!(grid.occupied_count(), 1);
        assert!(!grid.free_positions().contains(&pos));
    }

    #[test]
    fn set_rejects_a_unit_standing_elsewhere() {
        let mut world = World::new();
        let mut grid = Grid::new(5, 5);
        let id = world.register_client(Position::new(1, 2), 25);
        let err = grid
            .set(Position::new(3, 3), Some(UnitRef::Client(id)), &world)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidUnitAssignment { .. }));
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn set_rejects_a_dangling_handle() {
        let world = World::new();
        let mut grid = Grid::new(5, 5);
        let pos = Position::new(0, 0);
        let err = grid
            .set(pos, Some(UnitRef::Company(crate::types::CompanyId(9))), &world)
            .unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidUnitAssignment {
                pos,
                unit: UnitRef::Company(crate::types::CompanyId(9)),
            }
        );
    }

    #[test]
    fn clearing_a_cell_is_always_allowed() {
        let mut world = World::new();
        let mut grid = Grid::new(2, 2);
        let pos = Position::new(1, 1);
        let id = world.register_client(pos, 25);
        grid.set(pos, Some(UnitRef::Client(id)), &world).unwrap();
        grid.set(pos, None, &world).unwrap();
        assert!(grid.is_vacant(pos));
    }

    #[test]
    fn positions_are_row_major() {
        let grid = Grid::new(2, 2);
        let all: Vec<_> = grid.positions().collect();
        assert_eq!(
            all,
            vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 0),
                Position::new(1, 1),
            ]
        );
    }
}
