//! Shared numeric constants for bound construction.

/// Extra ulps on top of one per latent factor in the rounding allowance.
const ALLOWANCE_PAD_ULPS: f64 = 4.0;

/// Relative slack added to every item bound.
///
/// An f32 inner product over `n` factors can exceed the exact value by at most
/// about `n · ε · ‖u‖ · ‖v‖`, so widening each bound by `‖v‖ · allowance`
/// keeps `score(u, v) <= ‖u‖ · bound` true for the computed scores as well.
#[inline]
pub fn rounding_allowance(num_factors: usize) -> f64 {
    (num_factors as f64 + ALLOWANCE_PAD_ULPS) * f32::EPSILON as f64
}

/// Bin boundary used when the cluster's maximum angle is undefined.
///
/// With `θ_b = π` every angular gap clamps to zero and the bound degrades to
/// the plain Cauchy-Schwarz bound `‖v‖`, which holds for any user.
pub const DEGENERATE_BOUNDARY: f64 = std::f64::consts::PI;
