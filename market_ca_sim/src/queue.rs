// Ordered-sequence primitives: a FIFO of positions and a min-priority queue.
//
// `PathQueue` holds a route consumed head-first (a product's cached path) or
// a backlog of positions (a company's pending sale points). `reset` empties
// it in place, so a unit's path keeps its identity across recomputes.
//
// `PriorityQueue<T>` is the A* frontier: a `BinaryHeap` min-heap on an `f64`
// priority. Equal priorities pop in insertion order via a monotonic sequence
// number, the same tie-break the event queue in a tick-driven sim uses.
//
// **Critical constraint: determinism.** Priorities compare with
// `f64::total_cmp` and ties never fall back to heap layout.

use crate::types::Position;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

// ---------------------------------------------------------------------------
// FIFO
// ---------------------------------------------------------------------------

/// First-in first-out sequence of grid positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathQueue {
    items: VecDeque<Position>,
}

impl PathQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, pos: Position) {
        self.items.push_back(pos);
    }

    /// Remove and return the head, or `None` when empty.
    pub fn get(&mut self) -> Option<Position> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<Position> {
        self.items.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drop every element, keeping the queue itself.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.items.iter().copied()
    }
}

impl FromIterator<Position> for PathQueue {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Position> for PathQueue {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for PathQueue {
    type Item = Position;
    type IntoIter = std::collections::vec_deque::IntoIter<Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Min-priority queue
// ---------------------------------------------------------------------------

struct Entry<T> {
    priority: f64,
    sequence: u64,
    item: T,
}

// Reversed so the max-heap pops the smallest priority, then the earliest
// sequence.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

/// Min-priority queue with insertion-order tie-break.
pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_sequence: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn put(&mut self, item: T, priority: f64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Entry {
            priority,
            sequence,
            item,
        });
    }

    /// Remove and return the item with the lowest priority.
    pub fn get(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_queue_is_fifo() {
        let mut q = PathQueue::new();
        q.put(Position::new(0, 0));
        q.put(Position::new(0, 1));
        q.put(Position::new(0, 2));
        assert_eq!(q.len(), 3);
        assert_eq!(q.peek(), Some(Position::new(0, 0)));
        assert_eq!(q.get(), Some(Position::new(0, 0)));
        assert_eq!(q.get(), Some(Position::new(0, 1)));
        assert_eq!(q.get(), Some(Position::new(0, 2)));
        assert_eq!(q.get(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn reset_empties_in_place() {
        let mut q: PathQueue = [Position::new(1, 1), Position::new(2, 2)]
            .into_iter()
            .collect();
        q.reset();
        assert!(q.is_empty());
        q.put(Position::new(3, 3));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![Position::new(3, 3)]);
    }

    #[test]
    fn priority_queue_pops_lowest_first() {
        let mut pq = PriorityQueue::new();
        pq.put("c", 3.0);
        pq.put("a", 1.0);
        pq.put("b", 2.0);
        assert_eq!(pq.len(), 3);
        assert_eq!(pq.get(), Some("a"));
        assert_eq!(pq.get(), Some("b"));
        assert_eq!(pq.get(), Some("c"));
        assert_eq!(pq.get(), None);
    }

    #[test]
    fn equal_priorities_pop_in_insertion_order() {
        let mut pq = PriorityQueue::new();
        for i in 0..20 {
            pq.put(i, 4.5);
        }
        pq.put(-1, 0.5);
        assert_eq!(pq.get(), Some(-1));
        for i in 0..20 {
            assert_eq!(pq.get(), Some(i));
        }
        assert!(pq.is_empty());
    }
}
