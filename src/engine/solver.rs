//! Threshold-pruned top-K scan for a single user.
//!
//! Items are visited in descending bound order. Once the current K-th best
//! score beats `‖u‖ · bound` of the next item, no later item can qualify
//! (bounds only decrease from there) and the scan stops.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::sorter::BoundEntry;
use crate::geometry::dot;
use crate::types::{ItemId, LatentMatrix, ScoredItem, TopKResult, UserId};

/// A f32 wrapper that implements Ord using total_cmp.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrdF32(f32);

impl Eq for OrdF32 {}

impl PartialOrd for OrdF32 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF32 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Fixed-capacity selection of the best K candidates.
///
/// The heap top is the *worst* retained candidate: lowest score, and among
/// equal scores the highest item id. "Better" therefore matches
/// [`ScoredItem::rank_cmp`], so ties resolve exactly like a full sort.
struct TopKHeap {
    k: usize,
    heap: BinaryHeap<Reverse<(OrdF32, Reverse<ItemId>)>>,
}

impl TopKHeap {
    fn with_capacity(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    #[inline]
    fn worst(&self) -> Option<(f32, ItemId)> {
        self.heap
            .peek()
            .map(|Reverse((score, Reverse(id)))| (score.0, *id))
    }

    #[inline]
    fn offer(&mut self, score: f32, item_id: ItemId) {
        let cand = Reverse((OrdF32(score), Reverse(item_id)));
        if self.heap.len() < self.k {
            self.heap.push(cand);
        } else if let Some(mut top) = self.heap.peek_mut() {
            // Reverse flips the order: smaller means better here.
            if cand < *top {
                *top = cand;
            }
        }
    }

    fn into_ranked(self) -> Vec<ScoredItem> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse((score, Reverse(id)))| ScoredItem::new(score.0, id))
            .collect()
    }
}

/// The user side of a top-K query.
#[derive(Debug, Clone, Copy)]
pub struct UserQuery<'a> {
    pub user_id: UserId,
    pub vector: &'a [f32],
    /// `‖u‖`; must not be smaller than the true norm for pruning to be sound.
    pub norm: f64,
}

/// Top-K for one user, scanning `order` (one bin's sorted bounds).
///
/// `k` is clamped to the number of items; with `k >= order.len()` every item
/// is scored.
pub fn solve_user(
    query: &UserQuery<'_>,
    order: &[BoundEntry],
    items: &LatentMatrix<'_>,
    k: usize,
) -> TopKResult {
    let k = k.min(order.len());
    let mut top = TopKHeap::with_capacity(k);

    for entry in &order[..k] {
        let score = dot(query.vector, items.row(entry.item_id as usize));
        top.offer(score, entry.item_id);
    }
    let mut visited = k;

    for entry in &order[k..] {
        if let Some((kth, _)) = top.worst() {
            if kth as f64 > query.norm * entry.bound as f64 {
                break;
            }
        }
        let score = dot(query.vector, items.row(entry.item_id as usize));
        visited += 1;
        top.offer(score, entry.item_id);
    }

    TopKResult {
        user_id: query.user_id,
        items: top.into_ranked(),
        visited,
    }
}
