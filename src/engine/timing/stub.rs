use std::time::Duration;

/// Dummy lap timer when `timing` is disabled (zero-sized).
pub struct LapTimer;

impl LapTimer {
    #[inline(always)]
    pub fn start() -> Self {
        Self
    }

    #[inline(always)]
    pub fn lap(&mut self) -> Duration {
        Duration::ZERO
    }
}

/// Dummy timings when `timing` is disabled (zero-sized).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings;

impl StageTimings {
    #[inline(always)]
    pub fn total(&self) -> Duration {
        Duration::ZERO
    }

    #[inline(always)]
    pub fn merge(&mut self, _other: &StageTimings) {}

    #[inline(always)]
    pub fn report(&self, _label: &str, _num_users: usize) {}
}

/// Dummy builder when `timing` is disabled.
pub struct TimingBuilder;

impl TimingBuilder {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }

    #[inline(always)]
    pub fn set_angles(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_bounds(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_sort(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn set_solve(&mut self, _d: Duration) {}

    #[inline(always)]
    pub fn finish(self) -> StageTimings {
        StageTimings
    }
}
