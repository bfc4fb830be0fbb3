//! Bounded top-k collection: descending score, ascending key on ties.
//!
//! Generalized from a fixed `DocId` tiebreak to any `Ord` key, since the
//! caller's query-result key is its own `DocKey` type, not the internal
//! `DocId`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy)]
struct ScoreEntry<K> {
    score: f32,
    key: K,
}

impl<K: Eq> PartialEq for ScoreEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl<K: Eq> Eq for ScoreEntry<K> {}

impl<K: Ord> PartialOrd for ScoreEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rust's `BinaryHeap` is a max-heap; reverse the score ordering so the
/// *worst* of the top-k sits at the top and gets evicted first. Ties break
/// by ascending key, for a deterministic result order.
impl<K: Ord> Ord for ScoreEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.key.cmp(&other.key),
        }
    }
}

pub struct TopK<K: Ord> {
    size: usize,
    heap: BinaryHeap<ScoreEntry<K>>,
}

impl<K: Ord> TopK<K> {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            heap: BinaryHeap::new(),
        }
    }

    pub fn offer(&mut self, score: f32, key: K) {
        if self.size == 0 {
            return;
        }
        if self.heap.len() < self.size {
            self.heap.push(ScoreEntry { score, key });
        } else if let Some(top) = self.heap.peek() {
            if score > top.score {
                self.heap.push(ScoreEntry { score, key });
                self.heap.pop();
            }
        }
    }

    /// Descending by score, ascending key on ties.
    pub fn into_sorted_vec(self) -> Vec<(K, f32)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|e| (e.key, e.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_best_n() {
        let mut heap = TopK::new(2);
        heap.offer(0.6, 1u32);
        heap.offer(0.8, 2u32);
        heap.offer(0.7, 3u32);
        let out = heap.into_sorted_vec();
        assert_eq!(out, vec![(2, 0.8), (3, 0.7)]);
    }

    #[test]
    fn ties_break_ascending_by_key() {
        let mut heap = TopK::new(10);
        heap.offer(0.5, 3u32);
        heap.offer(0.5, 1u32);
        heap.offer(0.5, 2u32);
        let out = heap.into_sorted_vec();
        assert_eq!(out, vec![(1, 0.5), (2, 0.5), (3, 0.5)]);
    }

    #[test]
    fn zero_size_keeps_nothing() {
        let mut heap: TopK<u32> = TopK::new(0);
        heap.offer(1.0, 1);
        assert!(heap.into_sorted_vec().is_empty());
    }
}
