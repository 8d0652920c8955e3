use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ashlar_shared::coords::ChunkPos;

/// A pending mesh build, ordered by camera distance so nearby chunks appear
/// first. Ties break on the coordinate, which keeps dequeue order fully
/// deterministic for identical inputs.
#[derive(Debug, Copy, Clone)]
struct QueueEntry {
    pos: ChunkPos,
    distance: f32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.pos.cmp(&other.pos))
    }
}

/// Min-heap of pending chunk-mesh builds keyed by distance from the camera.
/// Duplicate coordinates may coexist; a stale duplicate becomes a no-op at
/// dequeue time once the chunk's mesh is already current.
#[derive(Debug, Default)]
pub struct RenderQueue {
    heap: BinaryHeap<Reverse<QueueEntry>>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pos: ChunkPos, distance: f32) {
        self.heap.push(Reverse(QueueEntry { pos, distance }));
    }

    pub fn pop(&mut self) -> Option<ChunkPos> {
        self.heap.pop().map(|Reverse(entry)| entry.pos)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use ashlar_shared::coords::ChunkPos;

    use super::RenderQueue;

    #[test]
    fn dequeues_in_non_decreasing_distance_order() {
        let mut queue = RenderQueue::new();
        let entries = [
            (ChunkPos::new(5, 5), 7.07),
            (ChunkPos::new(0, 1), 1.0),
            (ChunkPos::new(3, 0), 3.0),
            (ChunkPos::new(0, 0), 0.0),
            (ChunkPos::new(-2, 0), 2.0),
        ];
        for (pos, distance) in entries {
            queue.push(pos, distance);
        }

        let mut last = f32::NEG_INFINITY;
        let expected = [
            ChunkPos::new(0, 0),
            ChunkPos::new(0, 1),
            ChunkPos::new(-2, 0),
            ChunkPos::new(3, 0),
            ChunkPos::new(5, 5),
        ];
        for expected_pos in expected {
            let pos = queue.pop().unwrap();
            assert_eq!(pos, expected_pos);
            let distance = entries.iter().find(|(p, _)| *p == pos).unwrap().1;
            assert!(distance >= last);
            last = distance;
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_distances_break_ties_deterministically() {
        let run = || {
            let mut queue = RenderQueue::new();
            queue.push(ChunkPos::new(1, 0), 1.0);
            queue.push(ChunkPos::new(0, 1), 1.0);
            queue.push(ChunkPos::new(-1, 0), 1.0);
            queue.push(ChunkPos::new(0, -1), 1.0);
            let mut order = Vec::new();
            while let Some(pos) = queue.pop() {
                order.push(pos);
            }
            order
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn duplicate_coordinates_are_allowed() {
        let mut queue = RenderQueue::new();
        queue.push(ChunkPos::new(2, 2), 2.8);
        queue.push(ChunkPos::new(2, 2), 2.8);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(ChunkPos::new(2, 2)));
        assert_eq!(queue.pop(), Some(ChunkPos::new(2, 2)));
        assert_eq!(queue.pop(), None);
    }
}
