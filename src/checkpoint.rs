//! End-of-size synchronization hook.
//!
//! The runner calls [`Checkpoint::size_done`] exactly once per size, right
//! after that size's summary is published. On hardware this is where a
//! breakpoint goes; on a host it can log, assert, or collect.

use crate::report::SizeSummary;
use crate::stats::TrialOutcome;

/// What a checkpoint gets to see.
#[derive(Clone, Copy, Debug)]
pub struct Progress<'a> {
    /// Position of the finished size in the matrix.
    pub index: usize,
    /// The summary just published.
    pub summary: &'a SizeSummary,
    /// Every summary published so far, this one included.
    pub published: &'a [SizeSummary],
    /// The last timed trial of this size.
    pub last_trial: Option<&'a TrialOutcome>,
}

/// Hook invoked after each size completes.
pub trait Checkpoint {
    /// Called once per finished size. The runner does not continue until
    /// this returns.
    fn size_done(&mut self, progress: &Progress<'_>);
}

impl<F> Checkpoint for F
where
    F: FnMut(&Progress<'_>),
{
    fn size_done(&mut self, progress: &Progress<'_>) {
        self(progress)
    }
}

/// Checkpoint that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    #[inline]
    fn size_done(&mut self, _progress: &Progress<'_>) {}
}

/// Executes a single `nop` per finished size.
///
/// Set a hardware breakpoint on [`Breakpoint::size_done`]; execution stops
/// once per size with the report intact, and resumes into the next size
/// when the debugger continues.
#[cfg(feature = "cortex-m")]
#[derive(Clone, Copy, Debug, Default)]
pub struct Breakpoint;

#[cfg(feature = "cortex-m")]
impl Checkpoint for Breakpoint {
    #[inline(never)]
    fn size_done(&mut self, progress: &Progress<'_>) {
        info!(
            "size {} done: {}x{} cpp_x256={} failures={} saturated={}",
            progress.index,
            progress.summary.width,
            progress.summary.height,
            progress.summary.cpp_x256_avg,
            progress.summary.failures,
            progress.summary.saturated
        );
        cortex_m::asm::nop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_sees_progress() {
        let summary = SizeSummary {
            width: 4,
            height: 2,
            ..SizeSummary::default()
        };
        let published = [summary];
        let mut seen = None;
        let mut hook = |p: &Progress<'_>| seen = Some((p.index, p.summary.width, p.published.len()));
        hook.size_done(&Progress {
            index: 0,
            summary: &summary,
            published: &published,
            last_trial: None,
        });
        assert_eq!(seen, Some((0, 4, 1)));
    }

    #[test]
    fn no_checkpoint_is_inert() {
        let summary = SizeSummary::default();
        NoCheckpoint.size_done(&Progress {
            index: 3,
            summary: &summary,
            published: &[],
            last_trial: None,
        });
    }
}
