//! Per-cluster top-K engine.
//!
//! Users of one cluster are binned by their angle to the centroid. Every bin
//! gets one upper bound per item, items are sorted by that bound, and each
//! user scans its bin's order until the bound can no longer beat the K-th
//! best score.
//!
//! Stages, leaf first:
//! - [`bins`]: bin boundaries and bin lookup
//! - [`bounds`]: the bin × item bound table
//! - [`sorter`]: per-bin descending visitation order
//! - [`solver`]: the per-user pruned scan
//! - [`compute`]: runs the stages for one cluster

pub mod bins;
pub mod bounds;
pub mod compute;
mod constants;
pub mod solver;
pub mod sorter;
pub mod timing;

pub use bins::{bin_index_for, build_bins, BinPlan};
pub use bounds::{upper_bound, BoundTable};
pub use compute::{compute_cluster_top_k, ClusterOutput};
pub use constants::{rounding_allowance, DEGENERATE_BOUNDARY};
pub use solver::{solve_user, UserQuery};
pub use sorter::{BoundEntry, SortedBounds};
pub use timing::StageTimings;
