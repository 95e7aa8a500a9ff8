//! Core data types for clustered top-K computation.
//!
//! All latent-factor data is borrowed: the caller owns the weight blocks and
//! the engine only reads rows out of them.

use crate::error::{check_len, TopKError};

/// User identifier as supplied by the caller's ID list.
pub type UserId = u32;

/// Item identifier; equal to the item's row index in the item block.
pub type ItemId = u32;

/// A borrowed, row-major block of latent-factor vectors.
///
/// Row `i` occupies `data[i * dim..(i + 1) * dim]`.
#[derive(Debug, Clone, Copy)]
pub struct LatentMatrix<'a> {
    data: &'a [f32],
    rows: usize,
    dim: usize,
}

impl<'a> LatentMatrix<'a> {
    /// Wrap a row-major slice, checking that it holds exactly `rows * dim` values.
    pub fn new(data: &'a [f32], rows: usize, dim: usize) -> Result<Self, TopKError> {
        if dim == 0 {
            return Err(TopKError::InvalidConfiguration(
                "number of latent factors must be positive".into(),
            ));
        }
        let expected = rows.checked_mul(dim).ok_or_else(|| {
            TopKError::InvalidConfiguration(format!("{} x {} block overflows usize", rows, dim))
        })?;
        check_len("latent matrix values", expected, data.len())?;
        Ok(Self { data, rows, dim })
    }

    /// Wrap a row-major slice whose row count is implied by its length.
    pub fn from_flat(data: &'a [f32], dim: usize) -> Result<Self, TopKError> {
        if dim == 0 || data.len() % dim != 0 {
            return Err(TopKError::InvalidConfiguration(format!(
                "{} values cannot be split into rows of {} factors",
                data.len(),
                dim
            )));
        }
        Ok(Self {
            data,
            rows: data.len() / dim,
            dim,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of latent factors per row.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row `i` as a slice of `dim` factors.
    ///
    /// # Panics
    /// Panics if `i >= rows`.
    #[inline]
    pub fn row(&self, i: usize) -> &'a [f32] {
        let start = i * self.dim;
        &self.data[start..start + self.dim]
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &'a [f32]> + 'a {
        self.data.chunks_exact(self.dim)
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }
}

/// The shared, read-only item side: latent vectors plus precomputed norms.
///
/// Built once per dataset and shared by every cluster computation.
#[derive(Debug, Clone, Copy)]
pub struct ItemTable<'a> {
    weights: LatentMatrix<'a>,
    norms: &'a [f64],
}

impl<'a> ItemTable<'a> {
    pub fn new(weights: LatentMatrix<'a>, norms: &'a [f64]) -> Result<Self, TopKError> {
        check_len("item norms", weights.rows(), norms.len())?;
        Ok(Self { weights, norms })
    }

    #[inline]
    pub fn weights(&self) -> &LatentMatrix<'a> {
        &self.weights
    }

    #[inline]
    pub fn norms(&self) -> &'a [f64] {
        self.norms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.weights.dim()
    }
}

/// Everything the engine needs about one cluster.
///
/// `user_ids[i]`, `users.row(i)` refer to the same user; `item_thetas[j]` is the
/// angle between item `j` and `centroid`.
#[derive(Debug, Clone, Copy)]
pub struct ClusterInput<'a> {
    pub cluster_id: u32,
    pub centroid: &'a [f32],
    pub user_ids: &'a [UserId],
    pub users: LatentMatrix<'a>,
    pub item_thetas: &'a [f64],
}

impl<'a> ClusterInput<'a> {
    pub fn new(
        cluster_id: u32,
        centroid: &'a [f32],
        user_ids: &'a [UserId],
        users: LatentMatrix<'a>,
        item_thetas: &'a [f64],
    ) -> Result<Self, TopKError> {
        check_len("user ids", users.rows(), user_ids.len())?;
        check_len("centroid factors", users.dim(), centroid.len())?;
        Ok(Self {
            cluster_id,
            centroid,
            user_ids,
            users,
            item_thetas,
        })
    }

    #[inline]
    pub fn num_users(&self) -> usize {
        self.users.rows()
    }
}

/// One ranked entry of a top-K list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem {
    pub score: f32,
    pub item_id: ItemId,
}

impl ScoredItem {
    #[inline]
    pub const fn new(score: f32, item_id: ItemId) -> Self {
        Self { score, item_id }
    }

    /// Ranking order: higher score first, then lower item id.
    #[inline]
    pub fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.item_id.cmp(&other.item_id))
    }
}

/// Ranked top-K items for one user plus the number of items actually scored.
#[derive(Debug, Clone, PartialEq)]
pub struct TopKResult {
    pub user_id: UserId,
    /// Descending by score, ties by ascending item id.
    pub items: Vec<ScoredItem>,
    /// Items scored before the scan terminated (always `>= items.len()`).
    pub visited: usize,
}

impl TopKResult {
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|s| s.item_id)
    }

    /// Score of the K-th (last) retained item.
    pub fn kth_score(&self) -> Option<f32> {
        self.items.last().map(|s| s.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latent_matrix_rows() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = LatentMatrix::new(&data, 3, 2).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.iter_rows().count(), 3);
    }

    #[test]
    fn test_latent_matrix_shape_mismatch() {
        let data = [1.0, 2.0, 3.0];
        assert!(matches!(
            LatentMatrix::new(&data, 2, 2),
            Err(TopKError::InconsistentInputLengths { expected: 4, actual: 3, .. })
        ));
        assert!(matches!(
            LatentMatrix::new(&data, 3, 0),
            Err(TopKError::InvalidConfiguration(_))
        ));
        assert!(LatentMatrix::from_flat(&data, 2).is_err());
    }

    #[test]
    fn test_rank_cmp_ties_by_id() {
        let a = ScoredItem::new(1.0, 7);
        let b = ScoredItem::new(1.0, 3);
        let c = ScoredItem::new(2.0, 9);
        let mut v = vec![a, b, c];
        v.sort_by(ScoredItem::rank_cmp);
        assert_eq!(v.iter().map(|s| s.item_id).collect::<Vec<_>>(), vec![9, 3, 7]);
    }
}
