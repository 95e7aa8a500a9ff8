//! Benchmark clustered top-K on synthetic latent factors.
//!
//! Run with: cargo run --release --bin bench_topk
//!
//! Usage:
//!   bench_topk                          Default sizes (20k users, 50k items)
//!   bench_topk --users 100k --items 1m  Custom sizes
//!   bench_topk --bins 1 2 4 8 16        Sweep bin counts
//!
//! For per-stage timing, build with `--features timing` and run with RUST_LOG=debug.

use std::time::Instant;

use clap::Parser;
use cluster_topk::engine::StageTimings;
use cluster_topk::{compute_all_clusters, Dataset, LatentMatrix, NullSink, TopKConfig};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('m') {
        (stripped, 1_000_000)
    } else if let Some(stripped) = s.strip_suffix('k') {
        (stripped, 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser, Debug)]
#[command(name = "bench_topk")]
#[command(about = "Benchmark clustered top-K retrieval")]
struct Args {
    #[arg(long, default_value = "20k", value_parser = parse_count)]
    users: usize,

    #[arg(long, default_value = "50k", value_parser = parse_count)]
    items: usize,

    #[arg(long, short = 'f', default_value_t = 50)]
    factors: usize,

    #[arg(long, short = 'c', default_value_t = 64)]
    clusters: usize,

    /// Bin counts to sweep
    #[arg(long, short = 'b', num_args = 1.., default_values_t = vec![1usize, 4, 16])]
    bins: Vec<usize>,

    #[arg(short = 'k', default_value_t = 10)]
    k: usize,

    /// Spread of users around their centroid (relative to centroid norm)
    #[arg(long, default_value_t = 0.3)]
    spread: f32,

    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Iterations per bin count
    #[arg(short = 'n', default_value_t = 3)]
    iterations: usize,
}

struct Synthetic {
    users: Vec<f32>,
    user_ids: Vec<u32>,
    items: Vec<f32>,
    centroids: Vec<f32>,
    assignments: Vec<u32>,
}

fn gaussian_like<R: Rng>(rng: &mut R) -> f32 {
    // Sum of uniforms; close enough to normal for benchmarking.
    (0..4).map(|_| rng.gen_range(-1.0f32..1.0)).sum::<f32>() * 0.5
}

fn generate(args: &Args) -> Synthetic {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let f = args.factors;

    let centroids: Vec<f32> = (0..args.clusters * f).map(|_| gaussian_like(&mut rng)).collect();
    let mut users = Vec::with_capacity(args.users * f);
    let mut assignments = Vec::with_capacity(args.users);
    for _ in 0..args.users {
        let c = rng.gen_range(0..args.clusters);
        assignments.push(c as u32);
        for j in 0..f {
            users.push(centroids[c * f + j] + args.spread * gaussian_like(&mut rng));
        }
    }
    let items: Vec<f32> = (0..args.items * f)
        .map(|_| gaussian_like(&mut rng) * rng.gen_range(0.2f32..1.5))
        .collect();

    Synthetic {
        users,
        user_ids: (0..args.users as u32).collect(),
        items,
        centroids,
        assignments,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    println!(
        "Generating {} users, {} items, {} factors, {} clusters (seed {})",
        args.users, args.items, args.factors, args.clusters, args.seed
    );
    let data = generate(&args);
    let dataset = Dataset {
        users: LatentMatrix::new(&data.users, args.users, args.factors).expect("user block"),
        user_ids: &data.user_ids,
        items: LatentMatrix::new(&data.items, args.items, args.factors).expect("item block"),
        centroids: LatentMatrix::new(&data.centroids, args.clusters, args.factors)
            .expect("centroid block"),
        assignments: &data.assignments,
    };

    println!();
    println!("{:>6} {:>12} {:>12} {:>10}", "bins", "mean ms", "min ms", "visited");
    for &bins in &args.bins {
        let config = TopKConfig {
            num_bins: bins,
            k: args.k,
            verify: false,
        };
        let mut times = Vec::with_capacity(args.iterations);
        let mut visited_fraction = 0.0;
        let mut stages = StageTimings::default();
        for _ in 0..args.iterations.max(1) {
            let start = Instant::now();
            let outputs =
                compute_all_clusters(&dataset, &config, &mut NullSink).expect("top-K run failed");
            times.push(start.elapsed().as_secs_f64() * 1000.0);
            let visited: usize = outputs.iter().map(|o| o.total_visited()).sum();
            visited_fraction = visited as f64 / (args.users * args.items) as f64;
            for o in &outputs {
                stages.merge(&o.timings);
            }
        }
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let min = times.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        println!(
            "{:>6} {:>12.1} {:>12.1} {:>9.2}%",
            bins,
            mean,
            min,
            visited_fraction * 100.0
        );
        if !stages.total().is_zero() {
            stages.report(&format!("{} bins, summed over clusters", bins), args.users);
        }
    }
}
