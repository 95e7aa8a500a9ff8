//! Whole-dataset driver: every cluster, optionally in parallel.
//!
//! Users arrive in arbitrary order with a cluster assignment each. They are
//! grouped by cluster, their rows are copied into contiguous cluster order,
//! and each cluster runs independently against the shared item table. Each
//! cluster buffers its own diagnostics; they are written to the caller's sink
//! afterwards in ascending cluster id order, so output is identical with and
//! without the `parallel` feature.

use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::engine::{compute_cluster_top_k, ClusterOutput};
use crate::error::{check_len, TopKError};
use crate::geometry::{angles_to_centroid, row_norms, CentroidAngles};
use crate::types::{ClusterInput, ItemTable, LatentMatrix, UserId};
use crate::TopKConfig;

/// All inputs of a full run.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    /// All users, one row each, in `user_ids` order.
    pub users: LatentMatrix<'a>,
    pub user_ids: &'a [UserId],
    pub items: LatentMatrix<'a>,
    /// One centroid row per cluster id.
    pub centroids: LatentMatrix<'a>,
    /// Cluster id of each user, index-aligned with `users`.
    pub assignments: &'a [u32],
}

impl Dataset<'_> {
    fn check(&self) -> Result<(), TopKError> {
        check_len("user ids", self.users.rows(), self.user_ids.len())?;
        check_len("cluster assignments", self.users.rows(), self.assignments.len())?;
        check_len("item latent factors", self.users.dim(), self.items.dim())?;
        check_len("centroid latent factors", self.users.dim(), self.centroids.dim())?;
        if let Some(&bad) = self
            .assignments
            .iter()
            .find(|&&c| c as usize >= self.centroids.rows())
        {
            return Err(TopKError::InvalidConfiguration(format!(
                "cluster assignment {} has no centroid ({} centroids)",
                bad,
                self.centroids.rows()
            )));
        }
        Ok(())
    }
}

/// Users of one cluster, in their original relative order.
struct ClusterMembers {
    cluster_id: u32,
    rows: Vec<usize>,
}

fn group_by_cluster(assignments: &[u32]) -> Vec<ClusterMembers> {
    let mut groups: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
    for (row, &c) in assignments.iter().enumerate() {
        groups.entry(c).or_default().push(row);
    }
    let mut clusters: Vec<ClusterMembers> = groups
        .into_iter()
        .map(|(cluster_id, rows)| ClusterMembers { cluster_id, rows })
        .collect();
    clusters.sort_unstable_by_key(|m| m.cluster_id);
    clusters
}

fn run_cluster(
    dataset: &Dataset<'_>,
    items: &ItemTable<'_>,
    members: &ClusterMembers,
    config: &TopKConfig,
) -> Result<(ClusterOutput, Vec<DiagnosticRecord>), TopKError> {
    let dim = dataset.users.dim();
    let mut user_data = Vec::with_capacity(members.rows.len() * dim);
    let mut user_ids = Vec::with_capacity(members.rows.len());
    for &row in &members.rows {
        user_data.extend_from_slice(dataset.users.row(row));
        user_ids.push(dataset.user_ids[row]);
    }
    let users = LatentMatrix::new(&user_data, members.rows.len(), dim)?;

    let centroid = dataset.centroids.row(members.cluster_id as usize);
    let item_thetas = angles_to_centroid(items.weights(), items.norms(), centroid);
    let input = ClusterInput::new(members.cluster_id, centroid, &user_ids, users, &item_thetas)?;

    let mut records = Vec::with_capacity(members.rows.len());
    let output = compute_cluster_top_k(&input, items, config, &CentroidAngles, &mut records)?;
    Ok((output, records))
}

/// Run every non-empty cluster and return their outputs in cluster id order.
///
/// The first failing cluster (in cluster id order) aborts the run; nothing is
/// written to `sink` in that case.
pub fn compute_all_clusters<S: DiagnosticSink + ?Sized>(
    dataset: &Dataset<'_>,
    config: &TopKConfig,
    sink: &mut S,
) -> Result<Vec<ClusterOutput>, TopKError> {
    dataset.check()?;
    config.validate(dataset.items.rows(), dataset.items.dim())?;

    let item_norms = row_norms(&dataset.items);
    let items = ItemTable::new(dataset.items, &item_norms)?;
    let clusters = group_by_cluster(dataset.assignments);
    info!(
        "computing top-{} for {} users over {} items in {} clusters ({} bins)",
        config.k,
        dataset.users.rows(),
        items.len(),
        clusters.len(),
        config.num_bins
    );

    let per_cluster: Vec<Result<(ClusterOutput, Vec<DiagnosticRecord>), TopKError>> =
        maybe_par_into_iter!(clusters)
            .map(|members| run_cluster(dataset, &items, &members, config))
            .collect();

    let mut outputs = Vec::with_capacity(per_cluster.len());
    let mut records = Vec::with_capacity(per_cluster.len());
    for r in per_cluster {
        let (output, recs) = r?;
        outputs.push(output);
        records.push(recs);
    }
    for rec in records.iter().flatten() {
        sink.record(rec)?;
    }
    Ok(outputs)
}
