//! Per-trial measurements and their running aggregate.
//!
//! Cycles-per-pixel is carried as a fixed-point integer scaled by 256
//! (`cpp_x256`) so a target without an FPU can average it exactly. The
//! floating-point form is derived once, from the averaged integer.

use crate::config::SizeDescriptor;
use crate::report::SizeSummary;

/// Fixed-point shift of `cpp_x256`.
pub const CPP_SHIFT: u32 = 8;

/// `floor(ticks × 256 / max(pixels, 1))`.
///
/// The product is formed in 64 bits so it cannot wrap; a quotient that
/// does not fit a `u32` saturates.
#[inline]
pub const fn cpp_x256(ticks: u32, pixels: u32) -> u32 {
    let divisor = if pixels == 0 { 1 } else { pixels as u64 };
    let q = ((ticks as u64) << CPP_SHIFT) / divisor;
    if q > u32::MAX as u64 { u32::MAX } else { q as u32 }
}

/// Convert a `cpp_x256` value to cycles per pixel.
#[inline]
pub fn cpp_from_x256(cpp_x256: u32) -> f32 {
    cpp_x256 as f32 / (1u32 << CPP_SHIFT) as f32
}

/// Result of one timed kernel call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialOutcome {
    /// Elapsed counter ticks.
    pub ticks: u32,
    /// Pixels converted.
    pub pixels: u32,
    /// `ticks × 256 / pixels`, floored.
    pub cpp_x256: u32,
    /// Whether the output matched the oracle byte for byte.
    pub matched: bool,
    /// Whether `ticks` reached the counter's range limit, so the call may
    /// have wrapped the counter.
    pub saturated: bool,
}

impl TrialOutcome {
    /// Derive the scaled cycles-per-pixel for a measurement.
    pub const fn new(ticks: u32, pixels: u32, matched: bool) -> Self {
        Self {
            ticks,
            pixels,
            cpp_x256: cpp_x256(ticks, pixels),
            matched,
            saturated: false,
        }
    }

    /// Mark the outcome saturated if `ticks` reached `max_ticks`, the
    /// largest value the counter can report.
    pub const fn at_limit(mut self, max_ticks: u32) -> Self {
        self.saturated = self.ticks >= max_ticks;
        self
    }
}

/// Running sums for one size group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aggregate {
    sum_ticks: u64,
    sum_cpp_x256: u64,
    failures: u32,
    saturated: u32,
    trials: u32,
}

impl Aggregate {
    /// Empty aggregate.
    pub const fn new() -> Self {
        Self {
            sum_ticks: 0,
            sum_cpp_x256: 0,
            failures: 0,
            saturated: 0,
            trials: 0,
        }
    }

    /// Fold one trial in.
    pub fn record(&mut self, outcome: &TrialOutcome) {
        self.sum_ticks += u64::from(outcome.ticks);
        self.sum_cpp_x256 += u64::from(outcome.cpp_x256);
        self.trials += 1;
        if !outcome.matched {
            self.failures += 1;
        }
        if outcome.saturated {
            self.saturated += 1;
        }
    }

    /// Trials recorded so far.
    pub fn trials(&self) -> u32 {
        self.trials
    }

    /// Trials whose output differed from the oracle.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Trials whose tick count reached the counter's limit.
    pub fn saturated(&self) -> u32 {
        self.saturated
    }

    /// Mean ticks, floored; zero before any trial.
    pub fn ticks_avg(&self) -> u32 {
        mean(self.sum_ticks, self.trials)
    }

    /// Mean of the per-trial `cpp_x256` values, floored; zero before any trial.
    pub fn cpp_x256_avg(&self) -> u32 {
        mean(self.sum_cpp_x256, self.trials)
    }

    /// Summary for `size` from the trials recorded so far.
    pub fn summarize(&self, size: SizeDescriptor) -> SizeSummary {
        let cpp_x256_avg = self.cpp_x256_avg();
        SizeSummary {
            width: size.width,
            height: size.height,
            ticks_avg: self.ticks_avg(),
            cpp_x256_avg,
            cpp_avg: cpp_from_x256(cpp_x256_avg),
            failures: self.failures,
            saturated: self.saturated,
            trials: self.trials,
        }
    }
}

// The mean of u32 samples always fits a u32.
fn mean(sum: u64, count: u32) -> u32 {
    sum.checked_div(u64::from(count)).unwrap_or(0) as u32
}
