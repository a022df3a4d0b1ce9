use core::cmp::Ordering;

use crate::position::Position;

/// Frontier entry for one planner invocation.
#[derive(Clone, Copy, Debug)]
pub(super) struct SearchNode {
    pub position: Position,
    pub cost: u32,
    /// `cost + weight * heuristic`.
    pub priority: f64,
    /// Consecutive TeleportOver tiles entered to reach this node.
    pub teleport_streak: u32,
    /// Push order, used as the final tie-breaker.
    pub sequence: u64,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, the frontier pops the lowest priority.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    fn node(priority: f64, sequence: u64) -> SearchNode {
        SearchNode {
            position: Position::ORIGIN,
            cost: 0,
            priority,
            teleport_streak: 0,
            sequence,
        }
    }

    #[test]
    fn heap_pops_lowest_priority_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(node(3.0, 0));
        heap.push(node(1.5, 2));
        heap.push(node(1.5, 1));
        heap.push(node(7.0, 3));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|n| n.sequence)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }
}
