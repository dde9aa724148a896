//! Published results of a harness run.
//!
//! A [`Report`] holds one [`SizeSummary`] slot per configured size. Slots
//! are filled in order as each size finishes and are never rewritten
//! afterwards, so a debugger or checkpoint hook reading slot `i` sees a
//! stable value from the moment size `i` completes.

use crate::config::SizeDescriptor;
use crate::stats::TrialOutcome;
use crate::timer::CounterKind;

/// Averaged results for one size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SizeSummary {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Mean elapsed ticks per image.
    pub ticks_avg: u32,
    /// Mean cycles per pixel × 256.
    pub cpp_x256_avg: u32,
    /// `cpp_x256_avg / 256`.
    pub cpp_avg: f32,
    /// Trials whose output differed from the oracle.
    pub failures: u32,
    /// Trials whose tick count reached the counter's limit; their timing
    /// may have wrapped.
    pub saturated: u32,
    /// Trials run.
    pub trials: u32,
}

impl SizeSummary {
    /// The size these results belong to.
    pub const fn size(&self) -> SizeDescriptor {
        SizeDescriptor::new(self.width, self.height)
    }

    /// Whether every trial matched the oracle.
    pub const fn passed(&self) -> bool {
        self.failures == 0
    }
}

/// Results for every size of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report<const N: usize> {
    summaries: [SizeSummary; N],
    completed: usize,
    last_trial: Option<TrialOutcome>,
    counter: CounterKind,
}

impl<const N: usize> Report<N> {
    /// Empty report for a run timed by `counter`.
    pub const fn new(counter: CounterKind) -> Self {
        Self {
            summaries: [SizeSummary {
                width: 0,
                height: 0,
                ticks_avg: 0,
                cpp_x256_avg: 0,
                cpp_avg: 0.0,
                failures: 0,
                saturated: 0,
                trials: 0,
            }; N],
            completed: 0,
            last_trial: None,
            counter,
        }
    }

    /// Summaries of the sizes finished so far, in run order.
    pub fn summaries(&self) -> &[SizeSummary] {
        &self.summaries[..self.completed]
    }

    /// Summary for size `index`, once that size has finished.
    pub fn summary(&self, index: usize) -> Option<&SizeSummary> {
        self.summaries().get(index)
    }

    /// Number of sizes finished.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Whether every configured size has finished.
    pub fn is_complete(&self) -> bool {
        self.completed == N
    }

    /// The most recent timed trial, across all sizes.
    pub fn last_trial(&self) -> Option<&TrialOutcome> {
        self.last_trial.as_ref()
    }

    /// Counter the ticks were measured with.
    pub fn counter(&self) -> CounterKind {
        self.counter
    }

    /// Failed trials summed over finished sizes.
    pub fn total_failures(&self) -> u32 {
        self.summaries().iter().map(|s| s.failures).sum()
    }

    /// Whether every finished size passed every trial.
    pub fn all_passed(&self) -> bool {
        self.summaries().iter().all(SizeSummary::passed)
    }

    pub(crate) fn record_trial(&mut self, outcome: TrialOutcome) {
        self.last_trial = Some(outcome);
    }

    /// Publish the next size's summary.
    ///
    /// # Panics
    ///
    /// Panics if all `N` slots are already filled.
    pub(crate) fn publish(&mut self, summary: SizeSummary) {
        assert!(self.completed < N, "all {N} summaries already published");
        self.summaries[self.completed] = summary;
        self.completed += 1;
    }
}
