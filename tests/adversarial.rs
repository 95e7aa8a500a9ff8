//! Degenerate geometry, exact ties, and other inputs that stress the bounds.

mod support;

use cluster_topk::validation::{brute_force_top_k, first_mismatch};
use cluster_topk::{compute_cluster, ClusterOutput, ScoredItem, TopKConfig};
use support::factors::{integer_matrix, random_matrix, ClusterFixture};

fn run(fx: &ClusterFixture, bins: usize, k: usize) -> ClusterOutput {
    let config = TopKConfig {
        num_bins: bins,
        k,
        verify: true,
    };
    compute_cluster(&fx.input(0), &fx.table(), &config).unwrap()
}

fn assert_matches_brute_force(fx: &ClusterFixture, out: &ClusterOutput, k: usize) {
    let items = fx.item_matrix();
    let users = fx.user_matrix();
    for (i, r) in out.results.iter().enumerate() {
        let expected = brute_force_top_k(users.row(i), &items, k);
        assert_eq!(first_mismatch(&expected, &r.items), None, "user {}", r.user_id);
    }
}

#[test]
fn test_integer_factors_with_heavy_ties() {
    let dim = 4;
    let items = integer_matrix(400, dim, 2, 1);
    let centroid = vec![1.0, 1.0, 0.0, 0.0];
    let users = integer_matrix(30, dim, 1, 2);
    let fx = ClusterFixture::new(dim, items, centroid, users);
    for bins in [1, 3, 7] {
        for k in [1, 4, 25] {
            let out = run(&fx, bins, k);
            assert_matches_brute_force(&fx, &out, k);
        }
    }
}

#[test]
fn test_duplicate_items_break_ties_by_id() {
    let dim = 3;
    let row = [0.5f32, -0.25, 1.0];
    let mut items: Vec<f32> = row.iter().copied().cycle().take(dim * 20).collect();
    items.extend_from_slice(&[0.1, 0.1, 0.1]);
    let fx = ClusterFixture::new(dim, items, vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 1.0]);
    let out = run(&fx, 2, 5);
    let ids: Vec<u32> = out.results[0].item_ids().collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_users_on_centroid_axis_collapse_to_one_bin() {
    let dim = 4;
    let centroid = vec![1.0, 0.0, 0.0, 0.0];
    let users = vec![
        2.0, 0.0, 0.0, 0.0, //
        0.5, 0.0, 0.0, 0.0, //
        7.0, 0.0, 0.0, 0.0,
    ];
    let fx = ClusterFixture::new(dim, random_matrix(150, dim, 3), centroid, users);
    let out = run(&fx, 5, 6);
    assert!(out.plan.is_degenerate());
    assert_eq!(out.plan.num_bins(), 1);
    assert_matches_brute_force(&fx, &out, 6);
}

#[test]
fn test_zero_norm_user_scores_everything() {
    let dim = 3;
    let mut users = random_matrix(5, dim, 4);
    users[6..9].fill(0.0);
    let fx = ClusterFixture::new(dim, random_matrix(80, dim, 5), vec![0.3, 0.3, 0.9], users);
    let out = run(&fx, 4, 3);
    assert!(out.plan.is_degenerate());
    assert!(out.theta_ucs[2].is_nan());
    let zero_user = &out.results[2];
    assert_eq!(zero_user.visited, 80);
    assert_eq!(
        zero_user.items,
        vec![
            ScoredItem::new(0.0, 0),
            ScoredItem::new(0.0, 1),
            ScoredItem::new(0.0, 2)
        ]
    );
    assert_matches_brute_force(&fx, &out, 3);
}

#[test]
fn test_zero_centroid_falls_back_to_norm_bounds() {
    let fx = ClusterFixture::new(
        6,
        random_matrix(200, 6, 6),
        vec![0.0; 6],
        random_matrix(20, 6, 7),
    );
    assert!(fx.item_thetas.iter().all(|t| t.is_nan()));
    let out = run(&fx, 3, 9);
    assert!(out.plan.is_degenerate());
    assert_matches_brute_force(&fx, &out, 9);
}

#[test]
fn test_zero_items_mixed_in() {
    let dim = 5;
    let mut items = random_matrix(120, dim, 8);
    for j in (0..120).step_by(7) {
        items[j * dim..(j + 1) * dim].fill(0.0);
    }
    let fx = ClusterFixture::new(dim, items, random_matrix(1, dim, 9), random_matrix(25, dim, 10));
    let out = run(&fx, 4, 15);
    assert_matches_brute_force(&fx, &out, 15);
}

#[test]
fn test_all_scores_negative() {
    // Items point away from every user; K-th scores are negative and bounds clamp at zero.
    let dim = 4;
    let centroid = vec![1.0, 1.0, 1.0, 1.0];
    let users = support::factors::clustered_users(&centroid, 20, 0.1, 11);
    let items: Vec<f32> = random_matrix(100, dim, 12)
        .into_iter()
        .map(|x| -(x.abs() + 0.1))
        .collect();
    let fx = ClusterFixture::new(dim, items, centroid, users);
    let out = run(&fx, 3, 5);
    assert!(out.results.iter().all(|r| r.kth_score().unwrap() < 0.0));
    assert_matches_brute_force(&fx, &out, 5);
}

#[test]
fn test_wide_norm_spread() {
    let dim = 8;
    let mut items = random_matrix(300, dim, 13);
    for (j, row) in items.chunks_exact_mut(dim).enumerate() {
        let scale = 10f32.powi((j % 7) as i32 - 3);
        row.iter_mut().for_each(|x| *x *= scale);
    }
    let fx = ClusterFixture::new(dim, items, random_matrix(1, dim, 14), random_matrix(30, dim, 15));
    for bins in [1, 6] {
        let out = run(&fx, bins, 10);
        assert_matches_brute_force(&fx, &out, 10);
    }
}

#[test]
fn test_single_item() {
    let fx = ClusterFixture::new(2, vec![3.0, -1.0], vec![1.0, 0.0], random_matrix(4, 2, 16));
    let out = run(&fx, 3, 10);
    for r in &out.results {
        assert_eq!(r.items.len(), 1);
        assert_eq!(r.visited, 1);
    }
}

#[test]
fn test_empty_cluster() {
    let fx = ClusterFixture::new(3, random_matrix(10, 3, 17), vec![1.0, 0.0, 0.0], Vec::new());
    let out = run(&fx, 4, 2);
    assert!(out.results.is_empty());
    assert!(out.theta_ucs.is_empty());
}
