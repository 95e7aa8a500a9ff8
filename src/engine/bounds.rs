//! Per-(bin, item) score upper bounds.
//!
//! For a user `u` in bin `b` (so `θ_uc <= θ_b`) and an item `v`, the triangle
//! inequality on angles gives `θ_uv >= θ_ic - θ_uc >= θ_ic - θ_b`. Cosine is
//! decreasing on `[0, π]`, hence
//!
//! ```text
//! score(u, v) = ‖u‖ ‖v‖ cos θ_uv <= ‖u‖ · ‖v‖ cos(max(0, θ_ic - θ_b))
//! ```
//!
//! and the table stores the factor after `‖u‖`.

use super::bins::BinPlan;
use super::constants::rounding_allowance;
use crate::error::{check_len, TopKError};
use crate::sort::{sortable_bound, try_filled};

/// `‖v‖ · cos(max(0, θ_ic - θ_b))`, exact arithmetic in f64.
#[inline]
pub fn upper_bound(item_norm: f64, theta_ic: f64, theta_b: f64) -> f64 {
    let gap = (theta_ic - theta_b).max(0.0);
    item_norm * gap.cos()
}

/// Smallest f32 that is `>= x` (for finite, non-negative `x`).
#[inline]
fn round_up_f32(x: f64) -> f32 {
    let f = x as f32;
    if (f as f64) < x && f.is_finite() {
        f32::from_bits(f.to_bits() + 1)
    } else {
        f
    }
}

/// Dense `num_bins × num_items` table of bounds, row-major by bin.
#[derive(Debug, Clone)]
pub struct BoundTable {
    num_bins: usize,
    num_items: usize,
    bounds: Vec<f32>,
}

impl BoundTable {
    /// Build the table for every bin of `plan` and every item.
    ///
    /// Stored values are widened by the f32 rounding allowance, rounded up,
    /// and sanitized to be non-negative so they can be packed into sort keys.
    pub fn build(
        plan: &BinPlan,
        item_norms: &[f64],
        item_thetas: &[f64],
        num_factors: usize,
    ) -> Result<Self, TopKError> {
        check_len("item angles", item_norms.len(), item_thetas.len())?;
        let num_bins = plan.num_bins();
        let num_items = item_norms.len();
        let len = num_bins
            .checked_mul(num_items)
            .ok_or(TopKError::AllocationFailure {
                what: "bound table",
                elements: usize::MAX,
            })?;
        let mut bounds = try_filled("bound table", len, 0.0f32)?;

        let allowance = rounding_allowance(num_factors);
        if num_items > 0 {
            for (row, &theta_b) in bounds.chunks_exact_mut(num_items).zip(plan.boundaries()) {
                for ((out, &n), &theta_ic) in row.iter_mut().zip(item_norms).zip(item_thetas) {
                    let b = upper_bound(n, theta_ic, theta_b) + n * allowance;
                    *out = sortable_bound(round_up_f32(b));
                }
            }
        }

        Ok(Self {
            num_bins,
            num_items,
            bounds,
        })
    }

    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    #[inline]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    #[inline]
    pub fn bound(&self, bin: usize, item: usize) -> f32 {
        self.bounds[bin * self.num_items + item]
    }

    /// All item bounds for one bin, indexed by item id.
    #[inline]
    pub fn row(&self, bin: usize) -> &[f32] {
        let start = bin * self.num_items;
        &self.bounds[start..start + self.num_items]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_upper_bound_formula() {
        assert_relative_eq!(upper_bound(2.0, 0.5, 0.5), 2.0);
        assert_relative_eq!(upper_bound(2.0, 0.2, 0.5), 2.0);
        assert_relative_eq!(upper_bound(2.0, 1.0, 0.5), 2.0 * 0.5f64.cos());
        assert!(upper_bound(1.0, PI, 0.0) < 0.0);
    }

    #[test]
    fn test_round_up_f32() {
        let x = 0.1f64;
        let f = round_up_f32(x);
        assert!(f as f64 >= x);
        assert_eq!(round_up_f32(0.5), 0.5);
        assert!(round_up_f32(1e-50) > 0.0);
    }

    #[test]
    fn test_table_monotone_in_bin() {
        let plan = BinPlan::for_cluster(&[0.05, 0.3, 0.6, 0.9], 6).unwrap();
        let norms = [1.0, 2.0, 0.5, 3.0, 1.5];
        let thetas = [0.0, 0.4, 1.2, FRAC_PI_2, 2.8];
        let table = BoundTable::build(&plan, &norms, &thetas, 8).unwrap();
        assert_eq!(table.num_bins(), 6);
        assert_eq!(table.num_items(), 5);
        for item in 0..5 {
            for bin in 1..6 {
                assert!(
                    table.bound(bin - 1, item) <= table.bound(bin, item),
                    "item {} bin {}",
                    item,
                    bin
                );
            }
        }
    }

    #[test]
    fn test_table_never_below_formula() {
        let plan = BinPlan::for_cluster(&[0.2, 0.7], 3).unwrap();
        let norms = [1.0, 4.0, 0.25];
        let thetas = [0.1, 1.0, 3.0];
        let table = BoundTable::build(&plan, &norms, &thetas, 16).unwrap();
        for (bin, &tb) in plan.boundaries().iter().enumerate() {
            for item in 0..3 {
                let exact = upper_bound(norms[item], thetas[item], tb).max(0.0);
                assert!(table.bound(bin, item) as f64 >= exact);
                // The allowance is tiny relative to the item norm.
                assert!(table.bound(bin, item) as f64 - exact < 1e-4 * norms[item]);
            }
        }
    }

    #[test]
    fn test_table_clamps_negative_to_zero() {
        let plan = BinPlan::for_cluster(&[0.0, 0.1], 1).unwrap();
        let table = BoundTable::build(&plan, &[1.0], &[PI], 4).unwrap();
        assert!(table.bound(0, 0) >= 0.0);
        assert!(table.bound(0, 0) < 1e-5);
    }

    #[test]
    fn test_table_length_mismatch() {
        let plan = BinPlan::for_cluster(&[0.1], 1).unwrap();
        assert!(matches!(
            BoundTable::build(&plan, &[1.0, 2.0], &[0.0], 4),
            Err(TopKError::InconsistentInputLengths { .. })
        ));
    }
}
