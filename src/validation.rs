//! Brute-force reference top-K and cross-checking of pruned results.
//!
//! Used by the runtime verification mode and by tests. Scores use the same
//! f32 inner product as the pruned scan, and ties resolve by ascending item
//! id, so a correct pruned result matches exactly.

use log::warn;

use crate::error::TopKError;
use crate::geometry::dot;
use crate::types::{LatentMatrix, ScoredItem, TopKResult};

/// Score every item and keep the best `k` (score descending, id ascending).
pub fn brute_force_top_k(user: &[f32], items: &LatentMatrix<'_>, k: usize) -> Vec<ScoredItem> {
    let mut all: Vec<ScoredItem> = items
        .iter_rows()
        .enumerate()
        .map(|(j, row)| ScoredItem::new(dot(user, row), j as u32))
        .collect();
    let k = k.min(all.len());
    if k == 0 {
        return Vec::new();
    }
    if k < all.len() {
        all.select_nth_unstable_by(k - 1, ScoredItem::rank_cmp);
        all.truncate(k);
    }
    all.sort_by(ScoredItem::rank_cmp);
    all
}

/// Index of the first rank where `actual` differs from `expected`.
pub fn first_mismatch(expected: &[ScoredItem], actual: &[ScoredItem]) -> Option<usize> {
    let common = expected.len().min(actual.len());
    (0..common)
        .find(|&i| {
            expected[i].item_id != actual[i].item_id
                || expected[i].score.to_bits() != actual[i].score.to_bits()
        })
        .or(if expected.len() != actual.len() {
            Some(common)
        } else {
            None
        })
}

/// Compare a pruned result against brute force for the same user vector.
pub fn verify_result(
    result: &TopKResult,
    user: &[f32],
    items: &LatentMatrix<'_>,
    k: usize,
) -> Result<(), TopKError> {
    let expected = brute_force_top_k(user, items, k);
    match first_mismatch(&expected, &result.items) {
        None => Ok(()),
        Some(rank) => {
            warn!(
                "user {}: pruned top-{} differs from brute force at rank {} (visited {})",
                result.user_id, k, rank, result.visited
            );
            Err(TopKError::VerificationFailed {
                user_id: result.user_id,
                rank,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_orders_and_truncates() {
        let data = [1.0, 5.0, 3.0, 5.0];
        let items = LatentMatrix::new(&data, 4, 1).unwrap();
        let top = brute_force_top_k(&[2.0], &items, 3);
        assert_eq!(
            top,
            vec![
                ScoredItem::new(10.0, 1),
                ScoredItem::new(10.0, 3),
                ScoredItem::new(6.0, 2)
            ]
        );
        assert_eq!(brute_force_top_k(&[2.0], &items, 10).len(), 4);
        assert!(brute_force_top_k(&[2.0], &items, 0).is_empty());
    }

    #[test]
    fn test_first_mismatch() {
        let a = [ScoredItem::new(2.0, 1), ScoredItem::new(1.0, 0)];
        let b = [ScoredItem::new(2.0, 1), ScoredItem::new(1.0, 4)];
        assert_eq!(first_mismatch(&a, &a), None);
        assert_eq!(first_mismatch(&a, &b), Some(1));
        assert_eq!(first_mismatch(&a, &a[..1]), Some(1));
    }

    #[test]
    fn test_verify_result_reports_rank() {
        let data = [1.0, 2.0];
        let items = LatentMatrix::new(&data, 2, 1).unwrap();
        let wrong = TopKResult {
            user_id: 9,
            items: vec![ScoredItem::new(1.0, 0)],
            visited: 1,
        };
        assert_eq!(
            verify_result(&wrong, &[1.0], &items, 1),
            Err(TopKError::VerificationFailed { user_id: 9, rank: 0 })
        );
    }
}
