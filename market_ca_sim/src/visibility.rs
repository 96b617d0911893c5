// Neighborhood queries shared by every unit kind.
//
// A unit sees the 8 cells around it (Chebyshev radius 1), never its own.
// At the grid boundary each axis range collapses onto the unit's own
// coordinate instead of going out of range: a unit in row 0 scans rows 0..=1,
// a unit in the last row scans the last two rows. Enumeration is row-major,
// which fixes the order random choices see.
//
// `passable_positions` narrows that to empty cells: where a unit can step or
// spawn.
//
// See also: `pathfinding.rs` (expands along passable positions),
// `agents.rs` (random moves and client purchases).

use crate::grid::Grid;
use crate::types::Position;
use smallvec::SmallVec;

/// At most 8 neighbors, kept on the stack.
pub type Neighborhood = SmallVec<[Position; 8]>;

fn axis_span(coord: u32, len: u32) -> (u32, u32) {
    let last = len.saturating_sub(1);
    let low = coord.saturating_sub(1);
    let high = if coord + 1 > last { coord } else { coord + 1 };
    (low, high)
}

/// Positions visible from `pos` on a `rows x cols` grid, row-major,
/// excluding `pos`. `pos` must lie inside the grid.
pub fn visible_positions(rows: u32, cols: u32, pos: Position) -> Neighborhood {
    let (row_low, row_high) = axis_span(pos.row, rows);
    let (col_low, col_high) = axis_span(pos.col, cols);
    let mut out = Neighborhood::new();
    for row in row_low..=row_high {
        for col in col_low..=col_high {
            let candidate = Position::new(row, col);
            if candidate != pos {
                out.push(candidate);
            }
        }
    }
    out
}

/// Visible positions whose cell is empty.
pub fn passable_positions(grid: &Grid, pos: Position) -> Neighborhood {
    visible_positions(grid.rows(), grid.cols(), pos)
        .into_iter()
        .filter(|&candidate| grid.is_vacant(candidate))
        .collect()
}
