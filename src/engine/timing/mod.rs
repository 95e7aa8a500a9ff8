//! Zero-cost stage timing for the cluster engine.
//!
//! When the `timing` feature is enabled, each cluster computation returns the
//! wall-clock time of each stage: user angles, bound construction, sorting,
//! and the per-user scans. When disabled, all types become zero-sized and report zero.

#[cfg(feature = "timing")]
mod real;
#[cfg(not(feature = "timing"))]
mod stub;

#[cfg(feature = "timing")]
pub use real::*;
#[cfg(not(feature = "timing"))]
pub use stub::*;
