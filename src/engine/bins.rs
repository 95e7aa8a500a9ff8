//! Angular binning of a cluster's users.

use log::{debug, warn};

use super::constants::DEGENERATE_BOUNDARY;
use crate::error::TopKError;

/// Ascending bin boundaries `θ_max · (i + 1) / n` for `i in 0..n`.
///
/// The last boundary is exactly `theta_max`.
pub fn build_bins(theta_max: f64, num_bins: usize) -> Result<Vec<f64>, TopKError> {
    if num_bins == 0 {
        return Err(TopKError::InvalidConfiguration(
            "number of bins must be positive".into(),
        ));
    }
    let n = num_bins as f64;
    let mut bounds: Vec<f64> = (0..num_bins)
        .map(|i| theta_max * (i + 1) as f64 / n)
        .collect();
    bounds[num_bins - 1] = theta_max;
    Ok(bounds)
}

/// Index of the first boundary `>= theta`, or the last index if there is none.
///
/// NaN compares false against everything and lands in the last bin.
#[inline]
pub fn bin_index_for(theta: f64, boundaries: &[f64]) -> usize {
    debug_assert!(!boundaries.is_empty());
    let last = boundaries.len() - 1;
    if theta.is_nan() {
        return last;
    }
    boundaries.partition_point(|&b| b < theta).min(last)
}

/// The bin layout chosen for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct BinPlan {
    boundaries: Vec<f64>,
    theta_max: f64,
    degenerate: bool,
}

impl BinPlan {
    /// Plan bins from the users' angles to the centroid.
    ///
    /// Falls back to a single bin when the maximum angle is non-finite (some
    /// user or the centroid has zero norm) or zero (every user lies on the
    /// centroid direction).
    pub fn for_cluster(theta_ucs: &[f64], num_bins: usize) -> Result<Self, TopKError> {
        if num_bins == 0 {
            return Err(TopKError::InvalidConfiguration(
                "number of bins must be positive".into(),
            ));
        }

        let theta_max = theta_ucs.iter().copied().fold(0.0f64, |m, t| {
            if t.is_finite() && m.is_finite() {
                m.max(t)
            } else {
                f64::NAN
            }
        });

        if !theta_max.is_finite() {
            warn!(
                "non-finite max user-to-centroid angle over {} users; using a single bin at π",
                theta_ucs.len()
            );
            return Ok(Self {
                boundaries: vec![DEGENERATE_BOUNDARY],
                theta_max,
                degenerate: true,
            });
        }

        if theta_max <= 0.0 {
            debug!("all users on the centroid direction; using a single bin");
            return Ok(Self {
                boundaries: vec![0.0],
                theta_max,
                degenerate: true,
            });
        }

        Ok(Self {
            boundaries: build_bins(theta_max, num_bins)?,
            theta_max,
            degenerate: false,
        })
    }

    #[inline]
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.boundaries.len()
    }

    /// Largest observed user angle (NaN if undefined).
    #[inline]
    pub fn theta_max(&self) -> f64 {
        self.theta_max
    }

    /// True when the single-bin fallback was applied.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    #[inline]
    pub fn bin_of(&self, theta_uc: f64) -> usize {
        bin_index_for(theta_uc, &self.boundaries)
    }
}
