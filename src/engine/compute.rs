//! Orchestration of the per-cluster stages.

use log::{debug, info};

use super::bins::BinPlan;
use super::bounds::BoundTable;
use super::solver::{solve_user, UserQuery};
use super::sorter::SortedBounds;
use super::timing::{LapTimer, StageTimings, TimingBuilder};
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::error::{check_len, TopKError};
use crate::geometry::AngleNormSource;
use crate::types::{ClusterInput, ItemTable, TopKResult};
use crate::validation::verify_result;
use crate::TopKConfig;

/// Everything produced for one cluster.
#[derive(Debug, Clone)]
pub struct ClusterOutput {
    pub cluster_id: u32,
    /// One result per user, in input order.
    pub results: Vec<TopKResult>,
    /// `θ_uc` per user, in input order.
    pub theta_ucs: Vec<f64>,
    /// The bin layout actually used (may be the single-bin fallback).
    pub plan: BinPlan,
    pub timings: StageTimings,
}

impl ClusterOutput {
    /// Total items scored across all users of the cluster.
    pub fn total_visited(&self) -> usize {
        self.results.iter().map(|r| r.visited).sum()
    }

    /// Mean fraction of the item set scored per user.
    pub fn mean_visited_fraction(&self, num_items: usize) -> f64 {
        if self.results.is_empty() || num_items == 0 {
            return 0.0;
        }
        self.total_visited() as f64 / (self.results.len() * num_items) as f64
    }
}

/// Compute top-K for every user of one cluster.
///
/// Stages: user angles/norms (via `angles`) → bin plan → bound table →
/// per-bin sorted order → per-user pruned scan. Diagnostics go to `sink` in
/// user order; the ranked lists are returned in [`ClusterOutput::results`].
/// All bin/bound tables are dropped on return.
pub fn compute_cluster_top_k<A, S>(
    input: &ClusterInput<'_>,
    items: &ItemTable<'_>,
    config: &TopKConfig,
    angles: &A,
    sink: &mut S,
) -> Result<ClusterOutput, TopKError>
where
    A: AngleNormSource + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    config.validate(items.len(), items.dim())?;
    check_len("user latent factors", items.dim(), input.users.dim())?;
    check_len("centroid factors", items.dim(), input.centroid.len())?;
    check_len("item angles", items.len(), input.item_thetas.len())?;
    check_len("user ids", input.users.rows(), input.user_ids.len())?;

    let num_users = input.num_users();
    let mut timing = TimingBuilder::new();
    let mut lap = LapTimer::start();

    let user_angles = angles.user_angles(&input.users, input.centroid);
    check_len("user angles", num_users, user_angles.theta_ucs.len())?;
    check_len("user norms", num_users, user_angles.norms.len())?;
    timing.set_angles(lap.lap());

    let plan = BinPlan::for_cluster(&user_angles.theta_ucs, config.num_bins)?;
    debug!(
        "cluster {}: theta_max={:.6} bins={} degenerate={}",
        input.cluster_id,
        plan.theta_max(),
        plan.num_bins(),
        plan.is_degenerate()
    );

    let table = BoundTable::build(&plan, items.norms(), input.item_thetas, items.dim())?;
    timing.set_bounds(lap.lap());

    let sorted = SortedBounds::build(&table)?;
    drop(table);
    timing.set_sort(lap.lap());

    let mut results = Vec::with_capacity(num_users);
    for (i, (&theta_uc, &norm)) in user_angles
        .theta_ucs
        .iter()
        .zip(&user_angles.norms)
        .enumerate()
    {
        let query = UserQuery {
            user_id: input.user_ids[i],
            vector: input.users.row(i),
            norm,
        };
        let order = sorted.bin(plan.bin_of(theta_uc));
        let result = solve_user(&query, order, items.weights(), config.k);

        if config.verify {
            verify_result(&result, query.vector, items.weights(), config.k)?;
        }

        sink.record(&DiagnosticRecord {
            user_id: result.user_id,
            cluster_id: input.cluster_id,
            theta_uc,
            visited: result.visited,
        })?;
        results.push(result);
    }
    timing.set_solve(lap.lap());

    let timings = timing.finish();
    timings.report(&format!("cluster {}", input.cluster_id), num_users);

    let output = ClusterOutput {
        cluster_id: input.cluster_id,
        results,
        theta_ucs: user_angles.theta_ucs,
        plan,
        timings,
    };
    info!(
        "cluster {}: {} users, {} bins, mean visited {:.1}% of {} items",
        output.cluster_id,
        num_users,
        output.plan.num_bins(),
        output.mean_visited_fraction(items.len()) * 100.0,
        items.len()
    );
    Ok(output)
}
