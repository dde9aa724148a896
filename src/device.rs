//! Bare-metal entry point for Cortex-M targets.
//!
//! ```ignore
//! #![no_std]
//! #![no_main]
//!
//! use graybench::{FrameStore, config};
//!
//! unsafe extern "C" {
//!     fn rgb_to_gray_scalar_asm(dst: *mut u8, ds: i32, src: *const u8, ss: i32, w: i32, h: i32);
//! }
//!
//! #[cortex_m_rt::entry]
//! fn main() -> ! {
//!     let cp = cortex_m::Peripherals::take().unwrap();
//!     let store = cortex_m::singleton!(: FrameStore<128, 128> = FrameStore::new()).unwrap();
//!     let kernel = |dst: &mut [u8], ds: usize, src: &[u8], ss: usize, w: usize, h: usize| unsafe {
//!         rgb_to_gray_scalar_asm(dst.as_mut_ptr(), ds as i32, src.as_ptr(), ss as i32, w as i32, h as i32)
//!     };
//!     graybench::run_on_device(cp, &config::DEFAULT, store, kernel)
//! }
//! ```

use crate::buffer::FrameStore;
use crate::checkpoint::Breakpoint;
use crate::config::HarnessConfig;
use crate::kernel::GrayKernel;
use crate::runner::{Harness, park_forever};
use crate::timer::{CycleCounter, TimingSource};

/// Run `config` against `kernel` with the best counter this core has,
/// stopping at a [`Breakpoint`] after each size, then park forever.
///
/// The report stays live in this frame while parked, so a debugger can
/// read every summary after the last size. A configuration error is
/// logged and the core parks without running anything.
pub fn run_on_device<K, const N: usize, const MAX_W: usize, const MAX_H: usize>(
    peripherals: cortex_m::Peripherals,
    config: &HarnessConfig<N>,
    store: &mut FrameStore<MAX_W, MAX_H>,
    mut kernel: K,
) -> !
where
    K: GrayKernel,
{
    let cortex_m::Peripherals {
        DCB: dcb,
        DWT: dwt,
        SYST: syst,
        ..
    } = peripherals;
    let mut counter = TimingSource::select(dcb, dwt, syst);
    let kind = counter.kind();
    info!(
        "graybench: timing with {} (cycle accurate: {}, wraps above {})",
        kind,
        kind.is_cycle_accurate(),
        kind.max_ticks()
    );

    let harness = Harness::new(*config);
    match harness.run(store, &mut kernel, &mut counter, &mut Breakpoint) {
        Ok(report) => {
            info!(
                "graybench: {} sizes, {} failed trials",
                report.completed(),
                report.total_failures()
            );
            core::hint::black_box(&report);
            park_forever()
        }
        Err(e) => {
            error!("graybench: {}", e);
            park_forever()
        }
    }
}
