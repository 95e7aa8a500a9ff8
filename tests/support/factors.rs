#![allow(dead_code)]

use cluster_topk::geometry::{angles_to_centroid, row_norms};
use cluster_topk::{ClusterInput, ItemTable, LatentMatrix};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Uniform random factors in [-1, 1).
pub fn random_matrix(rows: usize, dim: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rows * dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
}

/// Small integers in [-range, range]; inner products are exact in f32, so
/// score ties are common and exact.
pub fn integer_matrix(rows: usize, dim: usize, range: i32, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rows * dim)
        .map(|_| rng.gen_range(-range..=range) as f32)
        .collect()
}

/// `n` users scattered around `centroid` with per-factor jitter `spread`.
pub fn clustered_users(centroid: &[f32], n: usize, spread: f32, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n * centroid.len());
    for _ in 0..n {
        let scale: f32 = rng.gen_range(0.5..2.0);
        for &c in centroid {
            out.push(scale * c + rng.gen_range(-spread..spread));
        }
    }
    out
}

/// Owned data for one cluster plus the shared item side.
pub struct ClusterFixture {
    pub dim: usize,
    pub items: Vec<f32>,
    pub item_norms: Vec<f64>,
    pub item_thetas: Vec<f64>,
    pub centroid: Vec<f32>,
    pub users: Vec<f32>,
    pub user_ids: Vec<u32>,
}

impl ClusterFixture {
    pub fn new(dim: usize, items: Vec<f32>, centroid: Vec<f32>, users: Vec<f32>) -> Self {
        let item_m = LatentMatrix::from_flat(&items, dim).unwrap();
        let item_norms = row_norms(&item_m);
        let item_thetas = angles_to_centroid(&item_m, &item_norms, &centroid);
        let num_users = users.len() / dim;
        let user_ids = (0..num_users as u32).map(|i| 1000 + i * 3).collect();
        Self {
            dim,
            items,
            item_norms,
            item_thetas,
            centroid,
            users,
            user_ids,
        }
    }

    /// Random items, users jittered around a random centroid.
    pub fn random(num_items: usize, num_users: usize, dim: usize, spread: f32, seed: u64) -> Self {
        let items = random_matrix(num_items, dim, seed);
        let centroid = random_matrix(1, dim, seed.wrapping_add(1));
        let users = clustered_users(&centroid, num_users, spread, seed.wrapping_add(2));
        Self::new(dim, items, centroid, users)
    }

    pub fn num_items(&self) -> usize {
        self.items.len() / self.dim
    }

    pub fn num_users(&self) -> usize {
        self.users.len() / self.dim
    }

    pub fn item_matrix(&self) -> LatentMatrix<'_> {
        LatentMatrix::from_flat(&self.items, self.dim).unwrap()
    }

    pub fn user_matrix(&self) -> LatentMatrix<'_> {
        LatentMatrix::from_flat(&self.users, self.dim).unwrap()
    }

    pub fn table(&self) -> ItemTable<'_> {
        ItemTable::new(self.item_matrix(), &self.item_norms).unwrap()
    }

    pub fn input(&self, cluster_id: u32) -> ClusterInput<'_> {
        ClusterInput::new(
            cluster_id,
            &self.centroid,
            &self.user_ids,
            self.user_matrix(),
            &self.item_thetas,
        )
        .unwrap()
    }
}
