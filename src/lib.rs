//! Correctness and cycles-per-pixel harness for RGB888 → Gray8 kernels.
//!
//! The harness fills a source plane with a deterministic RGB pattern,
//! computes a reference grayscale image with a fixed integer oracle, then
//! times a kernel under test over a matrix of image sizes. Every timed call
//! is checked byte for byte against the reference. Per-size averages are
//! published to a [`Report`] and a [`Checkpoint`] hook runs after each size,
//! which on hardware is where the debugger stops.
//!
//! - [`GrayKernel`]: the kernel calling convention (raw bases, strides, size)
//! - [`CycleCounter`]: start/stop tick source (DWT, SysTick, host clock)
//! - [`FrameStore`] / [`PlaneRef`] / [`PlaneMut`]: statically sized strided planes
//! - [`Harness`]: runs a [`HarnessConfig`] and returns a [`Report`]
//! - [`rgb_to_gray_ref`] / [`fill_pattern`]: the oracle and the test pattern
//!
//! ```
//! use graybench::{FrameStore, Harness, NoCheckpoint, ReferenceKernel, config};
//!
//! struct Fixed;
//! impl graybench::CycleCounter for Fixed {
//!     fn kind(&self) -> graybench::CounterKind { graybench::CounterKind::Custom }
//!     fn start(&mut self) {}
//!     fn stop(&mut self) -> u32 { 1024 }
//! }
//!
//! let mut store = FrameStore::<128, 128>::new();
//! let report = Harness::new(config::DEFAULT)
//!     .run(&mut store, &mut ReferenceKernel, &mut Fixed, &mut NoCheckpoint)
//!     .unwrap();
//! assert!(report.all_passed());
//! assert_eq!(report.summary(0).unwrap().cpp_x256_avg, 256);
//! ```
//!
//! # Features
//!
//! - `cortex-m`: SysTick counter, [`Breakpoint`] checkpoint and `run_on_device`
//! - `dwt`: DWT cycle counter, preferred over SysTick when present
//! - `defmt`: log through `defmt`; without it logging compiles away
//! - `imgref`: conversions from `imgref` views
//! - `std`: host clock counter and the `graybench-host` binary

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

mod buffer;
mod checkpoint;
pub mod config;
#[cfg(feature = "cortex-m")]
mod device;
mod kernel;
mod limits;
mod oracle;
mod pattern;
mod report;
mod runner;
mod stats;
mod timer;

pub use buffer::{BufferError, FrameStore, PlaneMut, PlaneRef, Planes, RowStride, SampleLayout};
#[cfg(feature = "cortex-m")]
pub use checkpoint::Breakpoint;
pub use checkpoint::{Checkpoint, NoCheckpoint, Progress};
pub use config::{ConfigError, HarnessConfig, SizeDescriptor};
#[cfg(feature = "cortex-m")]
pub use device::run_on_device;
pub use kernel::GrayKernel;
pub use limits::{CapacityLimits, LimitExceeded};
pub use oracle::{
    ReferenceKernel, WEIGHT_B, WEIGHT_G, WEIGHT_R, WEIGHT_SHIFT, luma, rgb_to_gray_ref,
    rgb_to_gray_ref_raw,
};
pub use pattern::{BLUE_STEP, GREEN_STEP, RED_STEP, fill_pattern, pattern_pixel};
pub use report::{Report, SizeSummary};
pub use runner::{Harness, park, park_forever};
pub use stats::{Aggregate, CPP_SHIFT, TrialOutcome, cpp_from_x256, cpp_x256};
#[cfg(feature = "dwt")]
pub use timer::DwtCounter;
#[cfg(feature = "std")]
pub use timer::InstantCounter;
pub use timer::{CounterKind, CycleCounter, SYSTICK_RELOAD};
#[cfg(feature = "cortex-m")]
pub use timer::{SysTickCounter, TimingSource};

pub use enough::{Stop, Unstoppable};
pub use rgb;
pub use rgb::Rgb;
