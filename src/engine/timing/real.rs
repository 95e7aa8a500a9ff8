use std::time::{Duration, Instant};

use log::debug;

/// Timer optimized for sequential stages: each `lap()` uses a single `Instant::now()`.
pub struct LapTimer(Instant);

impl LapTimer {
    #[inline]
    pub fn start() -> Self {
        Self(Instant::now())
    }

    #[inline]
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let d = now.duration_since(self.0);
        self.0 = now;
        d
    }
}

/// Per-cluster stage timings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    pub angles: Duration,
    pub bounds: Duration,
    pub sort: Duration,
    pub solve: Duration,
}

impl StageTimings {
    #[inline]
    pub fn total(&self) -> Duration {
        self.angles + self.bounds + self.sort + self.solve
    }

    pub fn merge(&mut self, other: &StageTimings) {
        self.angles += other.angles;
        self.bounds += other.bounds;
        self.sort += other.sort;
        self.solve += other.solve;
    }

    pub fn report(&self, label: &str, num_users: usize) {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        let total = ms(self.total());
        let pct = |d: Duration| {
            if total > 0.0 {
                ms(d) / total * 100.0
            } else {
                0.0
            }
        };
        debug!(
            "{label}: {num_users} users in {total:.3}ms | angles {:.3}ms ({:.1}%) | bounds {:.3}ms ({:.1}%) | sort {:.3}ms ({:.1}%) | solve {:.3}ms ({:.1}%)",
            ms(self.angles),
            pct(self.angles),
            ms(self.bounds),
            pct(self.bounds),
            ms(self.sort),
            pct(self.sort),
            ms(self.solve),
            pct(self.solve),
        );
    }
}

/// Builder for collecting stage timings.
pub struct TimingBuilder {
    timings: StageTimings,
}

impl TimingBuilder {
    pub fn new() -> Self {
        Self {
            timings: StageTimings::default(),
        }
    }

    pub fn set_angles(&mut self, d: Duration) {
        self.timings.angles = d;
    }

    pub fn set_bounds(&mut self, d: Duration) {
        self.timings.bounds = d;
    }

    pub fn set_sort(&mut self, d: Duration) {
        self.timings.sort = d;
    }

    pub fn set_solve(&mut self, d: Duration) {
        self.timings.solve = d;
    }

    pub fn finish(self) -> StageTimings {
        self.timings
    }
}
