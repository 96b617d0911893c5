// Resource-constrained A* over the cell grid.
//
// Nodes are cells, edges join a cell to each passable neighbor (see
// `visibility.rs`), and every step costs 1. The frontier is a
// `PriorityQueue` keyed by g + h with insertion-order tie-break, where h is
// the Euclidean distance to the goal. Stale frontier entries are simply
// re-expanded; there is no closed set.
//
// Euclidean h overestimates the remaining cost once diagonal steps cost 1,
// so it is not admissible under 8-directional movement. Routes are
// minimal-step on an open grid, but around obstacles they can come out a
// step or two longer than the shortest one.
//
// A search can carry a `MoveBudget`: a neighbor is only admitted when the
// walker could still afford to reach it (`price_per_move * g <= resource`).
// That is what keeps products from planning routes they would die halfway
// along.
//
// Search state lives in dense `Vec`s indexed by cell (`SearchTree`), so
// lookups are O(1) and nothing depends on hash order.
//
// See also: `agents.rs` which plans company routes and product moves,
// `queue.rs` for the frontier and the resulting `PathQueue`.
//
// **Critical constraint: determinism.** The result is a pure function of
// grid occupancy, endpoints and budget.

use crate::grid::Grid;
use crate::queue::{PathQueue, PriorityQueue};
use crate::types::Position;
use crate::visibility::passable_positions;
use tracing::trace;

/// Spending limit for a search: a path of `g` steps is affordable while
/// `price_per_move * g <= resource`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveBudget {
    pub resource: i64,
    pub price_per_move: i64,
}

impl MoveBudget {
    pub fn allows(self, steps: u32) -> bool {
        self.price_per_move.saturating_mul(i64::from(steps)) <= self.resource
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    Origin,
    From(Position),
}

/// Predecessor links and best-known step counts from one search.
#[derive(Clone, Debug)]
pub struct SearchTree {
    cols: u32,
    came_from: Vec<Option<Link>>,
    cost_so_far: Vec<Option<u32>>,
    /// Number of frontier pops, for logging.
    pub expanded: usize,
}

impl SearchTree {
    fn new(grid: &Grid) -> Self {
        Self {
            cols: grid.cols(),
            came_from: vec![None; grid.size()],
            cost_so_far: vec![None; grid.size()],
            expanded: 0,
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.col >= self.cols {
            return None;
        }
        let index = pos.row as usize * self.cols as usize + pos.col as usize;
        (index < self.came_from.len()).then_some(index)
    }

    fn record(&mut self, pos: Position, link: Link, cost: u32) {
        if let Some(index) = self.index(pos) {
            self.came_from[index] = Some(link);
            self.cost_so_far[index] = Some(cost);
        }
    }

    fn link(&self, pos: Position) -> Option<Link> {
        self.index(pos).and_then(|index| self.came_from[index])
    }

    /// Steps on the best known route to `pos`, `None` if never reached.
    pub fn cost_to(&self, pos: Position) -> Option<u32> {
        self.index(pos).and_then(|index| self.cost_so_far[index])
    }

    pub fn reached(&self, pos: Position) -> bool {
        self.link(pos).is_some()
    }

    /// The cell `pos` was reached from. `None` for the start cell and for
    /// cells the search never reached.
    pub fn predecessor(&self, pos: Position) -> Option<Position> {
        match self.link(pos)? {
            Link::Origin => None,
            Link::From(prev) => Some(prev),
        }
    }
}

/// Run A* from `start` toward `goal`.
///
/// Always returns the tree built so far; the goal is absent from it when no
/// affordable path exists.
pub fn astar_search(
    grid: &Grid,
    start: Position,
    goal: Position,
    budget: Option<MoveBudget>,
) -> SearchTree {
    let mut tree = SearchTree::new(grid);
    if !grid.contains(start) || !grid.contains(goal) {
        return tree;
    }

    let mut frontier = PriorityQueue::new();
    frontier.put(start, 0.0);
    tree.record(start, Link::Origin, 0);

    while let Some(current) = frontier.get() {
        tree.expanded += 1;
        if current == goal {
            break;
        }
        let Some(current_cost) = tree.cost_to(current) else {
            continue;
        };
        let next_cost = current_cost + 1;

        for next in passable_positions(grid, current) {
            let improves = tree.cost_to(next).is_none_or(|known| next_cost < known);
            let affordable = budget.is_none_or(|b| b.allows(next_cost));
            if improves && affordable {
                tree.record(next, Link::From(current), next_cost);
                let priority = f64::from(next_cost) + next.euclidean_distance(goal);
                frontier.put(next, priority);
            }
        }
    }

    tree
}

/// Walk predecessor links back from `goal`. Returns the full route
/// `[start, .., goal]`, or `None` when the goal was never reached.
pub fn reconstruct_path(tree: &SearchTree, start: Position, goal: Position) -> Option<Vec<Position>> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match tree.link(current)? {
            Link::Origin => return None,
            Link::From(prev) => {
                path.push(prev);
                current = prev;
            }
        }
    }
    path.reverse();
    Some(path)
}

/// Search and package the route as the steps still to take: the start is
/// dropped, so `start == goal` and "no path" both give an empty queue.
pub fn find_path(
    grid: &Grid,
    start: Position,
    goal: Position,
    budget: Option<MoveBudget>,
) -> PathQueue {
    let tree = astar_search(grid, start, goal, budget);
    let path: PathQueue = reconstruct_path(&tree, start, goal)
        .map(|route| route.into_iter().skip(1).collect())
        .unwrap_or_default();
    trace!(
        %start,
        %goal,
        ?budget,
        expanded = tree.expanded,
        steps = path.len(),
        "path search"
    );
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PRICE_PER_MOVE;
    use crate::types::UnitRef;
    use crate::world::World;

    fn p(row: u32, col: u32) -> Position {
        Position::new(row, col)
    }

    fn block(grid: &mut Grid, world: &mut World, cells: &[Position]) {
        for &pos in cells {
            let id = world.register_client(pos, 25);
            grid.set(pos, Some(UnitRef::Client(id)), world).unwrap();
        }
    }

    fn budget(resource: i64) -> Option<MoveBudget> {
        Some(MoveBudget {
            resource,
            price_per_move: PRICE_PER_MOVE,
        })
    }

    #[test]
    fn straight_line_on_open_grid() {
        let grid = Grid::new(5, 5);
        let path = find_path(&grid, p(2, 0), p(2, 4), None);
        assert_eq!(
            path.iter().collect::<Vec<_>>(),
            vec![p(2, 1), p(2, 2), p(2, 3), p(2, 4)]
        );
    }

    #[test]
    fn diagonal_takes_chebyshev_steps() {
        let grid = Grid::new(5, 5);
        let path = find_path(&grid, p(0, 0), p(4, 4), None);
        assert_eq!(path.len() as u32, p(0, 0).chebyshev_distance(p(4, 4)));
        assert_eq!(path.iter().last(), Some(p(4, 4)));
    }

    #[test]
    fn budget_cuts_off_unaffordable_routes() {
        let grid = Grid::new(5, 5);
        // Four steps cost 20.
        assert!(find_path(&grid, p(0, 0), p(4, 4), budget(15)).is_empty());
        assert_eq!(find_path(&grid, p(0, 0), p(4, 4), budget(20)).len(), 4);
    }

    #[test]
    fn budgeted_paths_never_overspend() {
        let grid = Grid::new(8, 8);
        for resource in 0..45 {
            let path = find_path(&grid, p(0, 0), p(7, 5), budget(resource));
            assert!(PRICE_PER_MOVE * path.len() as i64 <= resource);
        }
    }

    #[test]
    fn start_equals_goal_is_an_empty_path() {
        let grid = Grid::new(3, 3);
        let tree = astar_search(&grid, p(1, 1), p(1, 1), None);
        assert_eq!(reconstruct_path(&tree, p(1, 1), p(1, 1)), Some(vec![p(1, 1)]));
        assert!(find_path(&grid, p(1, 1), p(1, 1), None).is_empty());
    }

    #[test]
    fn full_wall_means_no_path() {
        let mut world = World::new();
        let mut grid = Grid::new(3, 5);
        block(&mut grid, &mut world, &[p(0, 2), p(1, 2), p(2, 2)]);
        let tree = astar_search(&grid, p(1, 0), p(1, 4), None);
        assert!(!tree.reached(p(1, 4)));
        assert_eq!(reconstruct_path(&tree, p(1, 0), p(1, 4)), None);
        assert!(find_path(&grid, p(1, 0), p(1, 4), None).is_empty());
    }

    #[test]
    fn routes_through_a_gap() {
        let mut world = World::new();
        let mut grid = Grid::new(3, 5);
        block(&mut grid, &mut world, &[p(0, 2), p(1, 2)]);
        let path = find_path(&grid, p(1, 0), p(1, 4), None);
        assert_eq!(
            path.iter().collect::<Vec<_>>(),
            vec![p(1, 1), p(2, 2), p(1, 3), p(1, 4)]
        );
    }

    #[test]
    fn obstructed_routes_stay_contiguous_and_never_beat_king_moves() {
        let mut world = World::new();
        let mut grid = Grid::new(9, 9);
        block(
            &mut grid,
            &mut world,
            &[p(2, 1), p(2, 2), p(2, 3), p(2, 4), p(2, 5), p(3, 5), p(4, 5), p(5, 5)],
        );
        for (start, goal) in [(p(0, 0), p(8, 8)), (p(0, 3), p(4, 3)), (p(8, 0), p(0, 8))] {
            let path = find_path(&grid, start, goal, None);
            assert!(path.len() as u32 >= start.chebyshev_distance(goal));
            let mut prev = start;
            for step in path.iter() {
                assert_eq!(prev.chebyshev_distance(step), 1);
                assert!(grid.is_vacant(step));
                prev = step;
            }
            assert_eq!(prev, goal);
        }
    }

    #[test]
    fn occupied_goal_is_unreachable() {
        let mut world = World::new();
        let mut grid = Grid::new(4, 4);
        block(&mut grid, &mut world, &[p(3, 3)]);
        assert!(find_path(&grid, p(0, 0), p(3, 3), None).is_empty());
    }

    #[test]
    fn predecessors_lead_back_to_start() {
        let grid = Grid::new(4, 4);
        let tree = astar_search(&grid, p(0, 0), p(3, 3), None);
        assert_eq!(tree.cost_to(p(0, 0)), Some(0));
        assert_eq!(tree.predecessor(p(0, 0)), None);
        let mut current = p(3, 3);
        let mut hops = 0;
        while let Some(prev) = tree.predecessor(current) {
            current = prev;
            hops += 1;
        }
        assert_eq!(current, p(0, 0));
        assert_eq!(Some(hops), tree.cost_to(p(3, 3)));
    }

    #[test]
    fn search_is_deterministic() {
        let mut world = World::new();
        let mut grid = Grid::new(10, 10);
        block(&mut grid, &mut world, &[p(4, 3), p(4, 4), p(4, 5), p(5, 5)]);
        let a = find_path(&grid, p(0, 0), p(9, 9), None);
        let b = find_path(&grid, p(0, 0), p(9, 9), None);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
