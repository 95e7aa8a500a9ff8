//! Dense-vector helpers and the default angle/norm collaborator.
//!
//! Scores are plain f32 inner products (the same routine is used by the pruned
//! scan and the brute-force reference, so both agree bit for bit). Norms and
//! angles feed the bound construction and are computed in f64.

use crate::types::LatentMatrix;

/// Inner product of two latent vectors, accumulated left to right in f32.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(0.0f32, |acc, (x, y)| acc + x * y)
}

#[inline]
fn dot_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum()
}

/// Euclidean norm, in f64.
#[inline]
pub fn norm(v: &[f32]) -> f64 {
    dot_f64(v, v).sqrt()
}

/// Angle in `[0, π]` between `v` and `c`, given their norms.
///
/// Returns NaN when either vector has zero norm (the angle is undefined).
#[inline]
pub fn angle_between(v: &[f32], v_norm: f64, c: &[f32], c_norm: f64) -> f64 {
    let denom = v_norm * c_norm;
    if !(denom > 0.0) {
        return f64::NAN;
    }
    (dot_f64(v, c) / denom).clamp(-1.0, 1.0).acos()
}

/// Per-row norms of a latent block.
pub fn row_norms(m: &LatentMatrix<'_>) -> Vec<f64> {
    m.iter_rows().map(norm).collect()
}

/// Angle between every row of `items` and `centroid`.
///
/// `norms` must be the row norms of `items`.
pub fn angles_to_centroid(m: &LatentMatrix<'_>, norms: &[f64], centroid: &[f32]) -> Vec<f64> {
    debug_assert_eq!(m.rows(), norms.len());
    let c_norm = norm(centroid);
    m.iter_rows()
        .zip(norms)
        .map(|(row, &n)| angle_between(row, n, centroid, c_norm))
        .collect()
}

/// Per-user angle-to-centroid and norm, index-aligned with the user block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserAngles {
    pub theta_ucs: Vec<f64>,
    pub norms: Vec<f64>,
}

/// Computes `(θ_uc, ‖u‖)` for every user of a cluster.
///
/// Implementations must return arrays whose length equals `users.rows()`, in
/// the same order; the engine rejects anything else.
pub trait AngleNormSource {
    fn user_angles(&self, users: &LatentMatrix<'_>, centroid: &[f32]) -> UserAngles;
}

/// Direct computation against the centroid vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidAngles;

impl AngleNormSource for CentroidAngles {
    fn user_angles(&self, users: &LatentMatrix<'_>, centroid: &[f32]) -> UserAngles {
        let norms = row_norms(users);
        let theta_ucs = angles_to_centroid(users, &norms, centroid);
        UserAngles { theta_ucs, norms }
    }
}
