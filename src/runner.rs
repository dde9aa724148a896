//! Trial runner: drives pattern, oracle, kernel and counter for each size.
//!
//! For every size in the matrix, in order:
//!
//! 1. fill the source plane with the test pattern;
//! 2. run the oracle into the reference plane;
//! 3. call the kernel once, untimed, to warm caches;
//! 4. for each trial, time one kernel call and compare its output with
//!    the reference byte for byte;
//! 5. publish the averaged [`SizeSummary`](crate::SizeSummary);
//! 6. hand control to the [`Checkpoint`].
//!
//! A mismatch is counted, never retried, and never cuts a size short.

use enough::{Stop, Unstoppable};

use crate::buffer::{BufferError, FrameStore, PlaneMut, PlaneRef, Planes};
use crate::checkpoint::{Checkpoint, Progress};
use crate::config::{ConfigError, HarnessConfig, SizeDescriptor};
use crate::kernel::GrayKernel;
use crate::limits::CapacityLimits;
use crate::oracle::rgb_to_gray_ref;
use crate::pattern::fill_pattern;
use crate::report::{Report, SizeSummary};
use crate::stats::{Aggregate, TrialOutcome};
use crate::timer::CycleCounter;

/// Runs a fixed size matrix against one kernel.
#[derive(Clone, Copy, Debug)]
pub struct Harness<const N: usize> {
    config: HarnessConfig<N>,
}

impl<const N: usize> Harness<N> {
    /// Harness for `config`. Validation happens in [`run`](Self::run),
    /// against the capacity of the store it is given.
    pub const fn new(config: HarnessConfig<N>) -> Self {
        Self { config }
    }

    /// Run every size and return the finished report.
    ///
    /// The counter is initialized once before the first size. The
    /// checkpoint is called after each size's summary is published.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] before any kernel call if the matrix is
    /// empty, the trial count is zero, or a size does not fit `store`.
    pub fn run<K, C, P, const MAX_W: usize, const MAX_H: usize>(
        &self,
        store: &mut FrameStore<MAX_W, MAX_H>,
        kernel: &mut K,
        counter: &mut C,
        checkpoint: &mut P,
    ) -> Result<Report<N>, ConfigError>
    where
        K: GrayKernel + ?Sized,
        C: CycleCounter + ?Sized,
        P: Checkpoint + ?Sized,
    {
        self.config
            .validate(&CapacityLimits::frame(MAX_W, MAX_H))?;

        counter.init();
        let mut report = Report::new(counter.kind());
        info!("harness: {} sizes x {} trials", N, self.config.trials);

        for (index, &size) in self.config.sizes.iter().enumerate() {
            let planes = store
                .planes(size.width as usize, size.height as usize, self.config.stride)
                .map_err(|e| buffer_error(index, size, e))?;
            let summary = self.run_size(size, planes, kernel, counter, &mut report);
            report.publish(summary);
            debug!(
                "size {}: {}x{} ticks_avg={} cpp_x256={} failures={}/{}",
                index,
                summary.width,
                summary.height,
                summary.ticks_avg,
                summary.cpp_x256_avg,
                summary.failures,
                summary.trials
            );

            checkpoint.size_done(&Progress {
                index,
                summary: &summary,
                published: report.summaries(),
                last_trial: report.last_trial(),
            });
        }

        Ok(report)
    }

    fn run_size<K, C>(
        &self,
        size: SizeDescriptor,
        planes: Planes<'_>,
        kernel: &mut K,
        counter: &mut C,
        report: &mut Report<N>,
    ) -> SizeSummary
    where
        K: GrayKernel + ?Sized,
        C: CycleCounter + ?Sized,
    {
        let Planes {
            mut src,
            mut dst,
            mut reference,
        } = planes;

        fill_pattern(&mut src);
        let src = src.as_plane();
        rgb_to_gray_ref(&mut reference, &src);
        let reference = reference.as_plane();

        call(kernel, &mut dst, &src);

        let pixels = size.pixels();
        let max_ticks = counter.kind().max_ticks();
        let mut agg = Aggregate::new();
        for trial in 0..self.config.trials {
            seed_mismatch(&mut dst, &reference);

            counter.start();
            call(kernel, &mut dst, &src);
            let ticks = counter.stop();

            let matched = dst.as_plane().same_pixels(&reference);
            if !matched {
                warn!(
                    "{}x{} trial {}: output differs from reference",
                    size.width, size.height, trial
                );
            }
            let outcome = TrialOutcome::new(ticks, pixels, matched).at_limit(max_ticks);
            if outcome.saturated {
                warn!(
                    "{}x{} trial {}: {} ticks at counter limit",
                    size.width, size.height, trial, ticks
                );
            }
            agg.record(&outcome);
            report.record_trial(outcome);
        }

        agg.summarize(size)
    }
}

/// Invoke `kernel` with the planes' raw bases, strides and dimensions.
#[inline(always)]
fn call<K: GrayKernel + ?Sized>(kernel: &mut K, dst: &mut PlaneMut<'_>, src: &PlaneRef<'_>) {
    let (dst_stride, width, height) = (dst.stride(), dst.width(), dst.rows());
    kernel.convert(
        dst.as_bytes_mut(),
        dst_stride,
        src.as_bytes(),
        src.stride(),
        width,
        height,
    );
}

/// Overwrite `dst` with the complement of `reference`, so a kernel that
/// skips a sample cannot pass on output left over from an earlier call.
fn seed_mismatch(dst: &mut PlaneMut<'_>, reference: &PlaneRef<'_>) {
    for y in 0..reference.rows() {
        for (d, r) in dst.row_mut(y).iter_mut().zip(reference.row(y)) {
            *d = !*r;
        }
    }
}

fn buffer_error(index: usize, size: SizeDescriptor, error: BufferError) -> ConfigError {
    error!(
        "size {}: {}x{} rejected by frame store",
        index, size.width, size.height
    );
    ConfigError::Buffer { index, error }
}

/// Spin until `stop` fires.
///
/// This is the harness's terminal idle state: nothing runs, so published
/// results stay exactly as the last size left them.
pub fn park(stop: &dyn Stop) {
    while !stop.should_stop() {
        core::hint::spin_loop();
    }
}

/// Spin forever.
pub fn park_forever() -> ! {
    loop {
        park(&Unstoppable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RowStride;
    use crate::checkpoint::NoCheckpoint;
    use crate::oracle::{ReferenceKernel, luma};
    use crate::pattern::pattern_pixel;
    use crate::timer::CounterKind;
    use alloc::vec::Vec;

    /// Replays a fixed tick sequence, one value per `stop`.
    struct Scripted<'a> {
        ticks: &'a [u32],
        next: usize,
        inits: u32,
        starts: u32,
    }

    impl<'a> Scripted<'a> {
        fn new(ticks: &'a [u32]) -> Self {
            Self {
                ticks,
                next: 0,
                inits: 0,
                starts: 0,
            }
        }
    }

    impl CycleCounter for Scripted<'_> {
        fn kind(&self) -> CounterKind {
            CounterKind::Custom
        }

        fn init(&mut self) {
            self.inits += 1;
        }

        fn start(&mut self) {
            self.starts += 1;
        }

        fn stop(&mut self) -> u32 {
            let t = self.ticks[self.next % self.ticks.len()];
            self.next += 1;
            t
        }
    }

    fn one_size(width: u32, height: u32, trials: u32) -> Harness<1> {
        Harness::new(HarnessConfig::new([SizeDescriptor::new(width, height)], trials))
    }

    #[test]
    fn reference_kernel_passes_default_matrix() {
        let mut store = FrameStore::<128, 128>::new();
        let mut counter = Scripted::new(&[1000]);
        let report = Harness::new(crate::config::DEFAULT)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        assert!(report.is_complete());
        assert!(report.all_passed());
        let sizes: Vec<_> = report.summaries().iter().map(|s| (s.width, s.height)).collect();
        assert_eq!(sizes, [(32, 32), (64, 64), (128, 64), (128, 128)]);
        assert!(report.summaries().iter().all(|s| s.trials == 10));
        assert_eq!(counter.inits, 1);
        assert_eq!(counter.starts, 40);
    }

    #[test]
    fn mean_ticks_over_trials() {
        let mut store = FrameStore::<32, 32>::new();
        let mut counter = Scripted::new(&[10, 20, 30, 40]);
        let report = one_size(32, 32, 4)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        let s = report.summary(0).unwrap();
        assert_eq!(s.ticks_avg, 25);
        assert_eq!(s.failures, 0);
    }

    #[test]
    fn unit_cycles_per_pixel() {
        let mut store = FrameStore::<32, 32>::new();
        let mut counter = Scripted::new(&[1024]);
        let report = one_size(32, 32, 3)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        let s = report.summary(0).unwrap();
        assert_eq!(s.cpp_x256_avg, 256);
        assert_eq!(s.cpp_avg, 1.0);
        let last = report.last_trial().unwrap();
        assert_eq!((last.ticks, last.pixels, last.cpp_x256), (1024, 1024, 256));
    }

    #[test]
    fn counts_exactly_the_failing_trials() {
        let mut store = FrameStore::<16, 16>::new();
        let mut counter = Scripted::new(&[50]);
        // Call 0 is the warm-up; trials are calls 1..=10.
        let mut call = 0;
        let mut kernel = |dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize| {
            ReferenceKernel.convert(dst, ds, src, ss, w, h);
            if call == 3 || call == 9 {
                dst[0] ^= 1;
            }
            call += 1;
        };
        let report = one_size(16, 16, 10)
            .run(&mut store, &mut kernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        let s = report.summary(0).unwrap();
        assert_eq!(s.failures, 2);
        assert_eq!(s.trials, 10);
        assert_eq!(s.ticks_avg, 50);
    }

    #[test]
    fn skipped_writes_are_caught() {
        let mut store = FrameStore::<8, 8>::new();
        let mut counter = Scripted::new(&[1]);
        // Correct on the warm-up, then never writes again.
        let mut first = true;
        let mut kernel = |dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize| {
            if first {
                ReferenceKernel.convert(dst, ds, src, ss, w, h);
                first = false;
            }
        };
        let report = one_size(8, 8, 5)
            .run(&mut store, &mut kernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        assert_eq!(report.summary(0).unwrap().failures, 5);
    }

    #[test]
    fn trials_at_counter_limit_are_flagged() {
        let mut store = FrameStore::<8, 8>::new();
        let mut counter = Scripted::new(&[40, u32::MAX, 60]);
        let report = one_size(8, 8, 3)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        let s = report.summary(0).unwrap();
        assert_eq!(s.saturated, 1);
        assert_eq!(s.failures, 0);
        assert!(!report.last_trial().unwrap().saturated);
    }

    #[test]
    fn kernel_sees_oracle_arguments() {
        let mut store = FrameStore::<16, 8>::new();
        let mut counter = Scripted::new(&[1]);
        let mut seen = Vec::new();
        let mut kernel = |dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize| {
            seen.push((ds, ss, w, h));
            ReferenceKernel.convert(dst, ds, src, ss, w, h);
        };
        let harness = Harness::new(
            HarnessConfig::new([SizeDescriptor::new(4, 2)], 2).with_stride(RowStride::Capacity),
        );
        harness
            .run(&mut store, &mut kernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        // Warm-up plus two trials, all with identical arguments.
        assert_eq!(seen, [(16, 48, 4, 2); 3]);
    }

    #[test]
    fn pattern_reaches_kernel() {
        let mut store = FrameStore::<8, 8>::new();
        let mut counter = Scripted::new(&[1]);
        let mut checked = false;
        let mut kernel = |dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize| {
            let px = pattern_pixel(2, 1);
            assert_eq!(&src[ss + 6..ss + 9], &[px.r, px.g, px.b]);
            ReferenceKernel.convert(dst, ds, src, ss, w, h);
            assert_eq!(dst[ds + 2], luma(px));
            checked = true;
        };
        one_size(8, 8, 1)
            .run(&mut store, &mut kernel, &mut counter, &mut NoCheckpoint)
            .unwrap();
        assert!(checked);
    }

    #[test]
    fn checkpoint_once_per_size_in_order() {
        let mut store = FrameStore::<64, 64>::new();
        let mut counter = Scripted::new(&[7]);
        let config = HarnessConfig::new(
            [
                SizeDescriptor::new(8, 8),
                SizeDescriptor::new(16, 4),
                SizeDescriptor::new(64, 64),
            ],
            2,
        );
        let mut calls = Vec::new();
        let mut hook = |p: &Progress<'_>| {
            assert_eq!(p.published.len(), p.index + 1);
            assert_eq!(p.published[p.index], *p.summary);
            assert!(p.last_trial.is_some());
            calls.push((p.index, p.summary.width, p.summary.height));
        };
        let report = Harness::new(config)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut hook)
            .unwrap();
        assert_eq!(calls, [(0, 8, 8), (1, 16, 4), (2, 64, 64)]);
        assert_eq!(report.completed(), 3);
    }

    #[test]
    fn published_summaries_stay_stable() {
        let mut store = FrameStore::<16, 16>::new();
        let mut counter = Scripted::new(&[3, 5]);
        let config = HarnessConfig::new([SizeDescriptor::new(4, 4), SizeDescriptor::new(16, 16)], 2);
        let mut snapshots = Vec::new();
        let mut hook = |p: &Progress<'_>| snapshots.push(p.published.to_vec());
        let report = Harness::new(config)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut hook)
            .unwrap();
        assert_eq!(snapshots[0][0], report.summaries()[0]);
        assert_eq!(snapshots[1], report.summaries());
    }

    #[test]
    fn oversized_matrix_rejected_before_any_call() {
        let mut store = FrameStore::<32, 32>::new();
        let mut counter = Scripted::new(&[1]);
        let mut calls = 0;
        let mut kernel = |_: &mut [u8], _: usize, _: &[u8], _: usize, _: usize, _: usize| calls += 1;
        let err = one_size(33, 32, 1)
            .run(&mut store, &mut kernel, &mut counter, &mut NoCheckpoint)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Capacity { index: 0, .. }));
        assert_eq!(calls, 0);
        assert_eq!(counter.inits, 0);
    }

    #[test]
    fn zero_trials_rejected() {
        let mut store = FrameStore::<8, 8>::new();
        let mut counter = Scripted::new(&[1]);
        let err = one_size(8, 8, 0)
            .run(&mut store, &mut ReferenceKernel, &mut counter, &mut NoCheckpoint)
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroTrials);
    }

    #[test]
    fn dyn_kernel_and_counter() {
        let mut store = FrameStore::<8, 8>::new();
        let mut scripted = Scripted::new(&[9]);
        let mut reference = ReferenceKernel;
        let kernel: &mut dyn GrayKernel = &mut reference;
        let counter: &mut dyn CycleCounter = &mut scripted;
        let report = one_size(8, 8, 2)
            .run(&mut store, kernel, counter, &mut NoCheckpoint)
            .unwrap();
        assert_eq!(report.summary(0).unwrap().ticks_avg, 9);
        assert_eq!(report.counter(), CounterKind::Custom);
    }
}
