//! Fixed-step slicing of elapsed frame time

use std::time::Duration;

/// Splits elapsed wall time into update slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
    max_delta: Duration,
}

impl FixedStep {
    /// `step` must be non-zero
    pub fn new(step: Duration, max_delta: Duration) -> Self {
        Self {
            step: step.max(Duration::from_nanos(1)),
            max_delta,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Elapsed time actually simulated for a frame
    pub fn clamp(&self, elapsed: Duration) -> Duration {
        elapsed.min(self.max_delta)
    }

    /// Slices for a frame: full steps, then the remainder when non-zero
    ///
    /// The slices always sum to the clamped elapsed time.
    pub fn slices(&self, elapsed: Duration) -> Slices {
        Slices {
            remaining: self.clamp(elapsed),
            step: self.step,
        }
    }
}

/// Iterator over the slice durations of one frame
#[derive(Debug, Clone)]
pub struct Slices {
    remaining: Duration,
    step: Duration,
}

impl Iterator for Slices {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining.is_zero() {
            return None;
        }
        let slice = self.remaining.min(self.step);
        self.remaining -= slice;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.as_nanos().div_ceil(self.step.as_nanos()) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Slices {}
