//! Exact per-user top-K retrieval for matrix-factorization recommenders.
//!
//! Scores are inner products between user and item latent-factor vectors.
//! Instead of scoring every item for every user, users are processed one
//! cluster at a time: within a cluster, users are binned by their angle to the
//! centroid, each bin gets a provable per-item score upper bound, and each
//! user scans items in descending bound order until no remaining item can
//! enter its top-K. Results are identical to brute force.
//!
//! # Example
//!
//! ```
//! use cluster_topk::{compute_cluster, ClusterInput, ItemTable, LatentMatrix, TopKConfig};
//! use cluster_topk::geometry::{angles_to_centroid, row_norms};
//!
//! // One latent factor, three items, one user.
//! let item_data = [1.0, 5.0, 3.0];
//! let items = LatentMatrix::new(&item_data, 3, 1).unwrap();
//! let item_norms = row_norms(&items);
//! let centroid = [1.0];
//! let item_thetas = angles_to_centroid(&items, &item_norms, &centroid);
//! let table = ItemTable::new(items, &item_norms).unwrap();
//!
//! let user_data = [2.0];
//! let users = LatentMatrix::new(&user_data, 1, 1).unwrap();
//! let input = ClusterInput::new(0, &centroid, &[100], users, &item_thetas).unwrap();
//!
//! let config = TopKConfig { num_bins: 1, k: 2, verify: true };
//! let out = compute_cluster(&input, &table, &config).unwrap();
//! let ids: Vec<u32> = out.results[0].item_ids().collect();
//! assert_eq!(ids, vec![1, 2]);
//! ```

macro_rules! maybe_par_into_iter {
    ($v:expr) => {{
        #[cfg(feature = "parallel")]
        {
            $v.into_par_iter()
        }
        #[cfg(not(feature = "parallel"))]
        {
            $v.into_iter()
        }
    }};
}

pub mod dataset;
pub mod diagnostics;
pub mod engine;
mod error;
pub mod geometry;
pub mod io;
mod sort;
mod types;
pub mod validation;

pub use dataset::{compute_all_clusters, Dataset};
pub use diagnostics::{CsvSink, DiagnosticRecord, DiagnosticSink, NullSink};
pub use engine::{compute_cluster_top_k, ClusterOutput};
pub use error::TopKError;
pub use geometry::{AngleNormSource, CentroidAngles, UserAngles};
pub use types::{ClusterInput, ItemId, ItemTable, LatentMatrix, ScoredItem, TopKResult, UserId};

const DEFAULT_NUM_BINS: usize = 4;
const DEFAULT_K: usize = 10;

/// Parameters of a top-K run.
#[derive(Debug, Clone, PartialEq)]
pub struct TopKConfig {
    /// Number of angular bins per cluster. More bins give tighter bounds at
    /// the cost of one bound row and one sort per bin.
    pub num_bins: usize,
    /// Items to return per user.
    pub k: usize,
    /// If true, every pruned result is cross-checked against brute force and
    /// a mismatch fails the cluster with [`TopKError::VerificationFailed`].
    pub verify: bool,
}

impl Default for TopKConfig {
    fn default() -> Self {
        Self {
            num_bins: DEFAULT_NUM_BINS,
            k: DEFAULT_K,
            verify: false,
        }
    }
}

impl TopKConfig {
    /// Apply `CLUSTER_TOPK_NUM_BINS`, `CLUSTER_TOPK_K` and `CLUSTER_TOPK_VERIFY`
    /// overrides from the environment. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_usize("CLUSTER_TOPK_NUM_BINS") {
            self.num_bins = n;
        }
        if let Some(k) = env_usize("CLUSTER_TOPK_K") {
            self.k = k;
        }
        if let Ok(v) = std::env::var("CLUSTER_TOPK_VERIFY") {
            self.verify = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        self
    }

    /// Reject non-positive bins, K, item count, or latent-factor count.
    pub fn validate(&self, num_items: usize, num_factors: usize) -> Result<(), TopKError> {
        let check = |value: usize, what: &str| {
            if value == 0 {
                Err(TopKError::InvalidConfiguration(format!(
                    "{} must be positive",
                    what
                )))
            } else {
                Ok(())
            }
        };
        check(self.num_bins, "number of bins")?;
        check(self.k, "K")?;
        check(num_items, "number of items")?;
        check(num_factors, "number of latent factors")?;
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Compute one cluster with the default angle/norm computation, discarding
/// diagnostics.
pub fn compute_cluster(
    input: &ClusterInput<'_>,
    items: &ItemTable<'_>,
    config: &TopKConfig,
) -> Result<ClusterOutput, TopKError> {
    compute_cluster_top_k(input, items, config, &CentroidAngles, &mut NullSink)
}

/// Compute one cluster, writing per-user diagnostics to `sink`.
pub fn compute_cluster_with<S: DiagnosticSink + ?Sized>(
    input: &ClusterInput<'_>,
    items: &ItemTable<'_>,
    config: &TopKConfig,
    sink: &mut S,
) -> Result<ClusterOutput, TopKError> {
    compute_cluster_top_k(input, items, config, &CentroidAngles, sink)
}
